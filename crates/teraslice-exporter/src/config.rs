//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use clap::builder::BoolishValueParser;
use teraslice_stats::CollectorConfig;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "teraslice-exporter",
    about = "Prometheus exporter for a Teraslice cluster",
    version
)]
pub struct ExporterConfig {
    /// Root URL of the Teraslice master, e.g. http://teraslice-master:5678.
    #[arg(long, env = "TERASLICE_URL")]
    pub teraslice_url: Url,

    /// Value of the `url` label. Defaults to the Teraslice URL.
    #[arg(long, env = "TERASLICE_DISPLAY_URL")]
    pub display_url: Option<String>,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Polling interval in milliseconds.
    #[arg(
        long,
        env = "TERASLICE_QUERY_DELAY",
        default_value = "30000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub query_delay: u64,

    /// Timeout for each Teraslice API request, in milliseconds.
    #[arg(
        long,
        env = "TERASLICE_REQUEST_TIMEOUT",
        default_value = "10000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout: u64,

    /// Enable debug logging.
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,
}

impl ExporterConfig {
    pub fn query_interval(&self) -> Duration {
        Duration::from_millis(self.query_delay)
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            request_timeout: Duration::from_millis(self.request_timeout),
            ..CollectorConfig::default()
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ExporterConfig, clap::Error> {
        ExporterConfig::try_parse_from(std::iter::once("teraslice-exporter").chain(args.iter().copied()))
    }

    #[test]
    fn parses_explicit_values() {
        let config = parse(&[
            "--teraslice-url",
            "http://teraslice-master:5678",
            "--display-url",
            "https://teraslice.example.com",
            "--port",
            "9100",
            "--query-delay",
            "15000",
            "--request-timeout",
            "2500",
            "--debug",
        ])
        .unwrap();

        assert_eq!(config.teraslice_url.as_str(), "http://teraslice-master:5678/");
        assert_eq!(config.display_url.as_deref(), Some("https://teraslice.example.com"));
        assert_eq!(config.listen_addr(), SocketAddr::from(([0, 0, 0, 0], 9100)));
        assert_eq!(config.query_interval(), Duration::from_secs(15));
        assert_eq!(
            config.collector_config().request_timeout,
            Duration::from_millis(2500)
        );
        assert_eq!(config.collector_config().job_page_size, 200);
        assert!(config.debug);
    }

    #[test]
    fn debug_accepts_boolish_values() {
        let config = parse(&["--teraslice-url", "http://localhost:5678", "--debug=no"]).unwrap();
        assert!(!config.debug);
        let config = parse(&["--teraslice-url", "http://localhost:5678", "--debug=1"]).unwrap();
        assert!(config.debug);
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(parse(&["--teraslice-url", "not a url"]).is_err());
    }

    #[test]
    fn rejects_zero_intervals() {
        let base = ["--teraslice-url", "http://localhost:5678"];
        let with = |extra: [&'static str; 2]| {
            let args: Vec<&str> = base.iter().copied().chain(extra).collect();
            parse(&args)
        };
        assert!(with(["--query-delay", "0"]).is_err());
        assert!(with(["--request-timeout", "0"]).is_err());
        assert_eq!(with(["--query-delay", "1"]).unwrap().query_interval(), Duration::from_millis(1));
    }
}
