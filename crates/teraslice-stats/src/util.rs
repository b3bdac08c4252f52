//! Derived-field helpers.

/// Extract the version from a container image reference.
///
/// Takes everything after the first `:` and cuts it at the first `_`, so
/// both `teraslice:v0.70.0` and `teraslice:v0.70.0_12345` yield `v0.70.0`.
/// An image without a tag yields an empty string.
pub fn extract_version_from_image_tag(image: &str) -> &str {
    match image.split_once(':') {
        Some((_, tag)) => tag.split_once('_').map_or(tag, |(version, _)| version),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_from_plain_tag() {
        assert_eq!(
            extract_version_from_image_tag("internal.terascope.io/teraslice:v0.70.0"),
            "v0.70.0"
        );
        assert_eq!(extract_version_from_image_tag("repo/name:v1.2.3"), "v1.2.3");
    }

    #[test]
    fn version_drops_build_suffix() {
        assert_eq!(
            extract_version_from_image_tag("internal.terascope.io/teraslice:v0.70.0_12345"),
            "v0.70.0"
        );
        assert_eq!(extract_version_from_image_tag("repo/name:v1.2.3_9999"), "v1.2.3");
    }

    #[test]
    fn version_empty_without_tag() {
        assert_eq!(extract_version_from_image_tag("internal.terascope.io/teraslice"), "");
        assert_eq!(extract_version_from_image_tag(""), "");
    }

    #[test]
    fn version_splits_on_first_colon() {
        assert_eq!(extract_version_from_image_tag("teraslice:"), "");
        assert_eq!(extract_version_from_image_tag("registry:5000/teraslice:v1"), "5000/teraslice:v1");
    }
}
