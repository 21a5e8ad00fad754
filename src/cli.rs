//! Command-line surface of the `postwatch` binary.
//!
//! Every flag can also come from a `POSTWATCH_*` environment variable so the
//! watcher can run under a service manager without a long command line.
//! Conflicts between persistence options are left to the library, which
//! rejects them with a [`ConfigurationError`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

use postwatch::source::DEFAULT_ORIGIN;
use postwatch::sink::DEFAULT_SMTP_PORT;
use postwatch::{
    ActionSink, CacheSettings, ConfigurationError, ConsoleSink, EmailSettings, EmailSink,
    PageSource, SearchFeedSource, SinkError, StoreConfig, UserFeedSource, WatcherOptions,
};
use postwatch::watcher::DEFAULT_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Print new posts to stdout.
    Console,
    /// Mail each new post.
    Email,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Watch this user's post feed.
    #[arg(long, env = "POSTWATCH_USER")]
    pub user: Option<String>,

    /// Watch the realtime results for this search term.
    #[arg(long, env = "POSTWATCH_SEARCH")]
    pub search: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "postwatch", version, about = "Watch a post feed or search page and act on new posts")]
pub struct Cli {
    #[command(flatten)]
    pub target: Target,

    /// Seconds to wait between cycles.
    #[arg(long, env = "POSTWATCH_INTERVAL", default_value_t = DEFAULT_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Run a single cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Site origin the sources point at.
    #[arg(long, env = "POSTWATCH_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// HTTP timeout in seconds.
    #[arg(long, env = "POSTWATCH_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Keep a snapshot of seen posts in this file.
    #[arg(long, env = "POSTWATCH_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Shared Redis cache, as a connection URL.
    #[arg(long, env = "POSTWATCH_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Shared Redis cache host; enables the settings bundle below.
    #[arg(long, env = "POSTWATCH_REDIS_HOST")]
    pub redis_host: Option<String>,

    #[arg(long, env = "POSTWATCH_REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    #[arg(long, env = "POSTWATCH_REDIS_DB", default_value_t = 0)]
    pub redis_db: i64,

    #[arg(long, env = "POSTWATCH_REDIS_USERNAME")]
    pub redis_username: Option<String>,

    #[arg(long, env = "POSTWATCH_REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    /// What to do with each new post.
    #[arg(long, value_enum, env = "POSTWATCH_SINK", default_value_t = SinkKind::Console)]
    pub sink: SinkKind,

    #[arg(long, env = "POSTWATCH_SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "POSTWATCH_SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,

    #[arg(long, env = "POSTWATCH_SMTP_LOGIN")]
    pub smtp_login: Option<String>,

    #[arg(long, env = "POSTWATCH_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Sender address of notification mails.
    #[arg(long, env = "POSTWATCH_MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Recipient of notification mails; defaults to the SMTP login.
    #[arg(long, env = "POSTWATCH_MAIL_TO")]
    pub mail_to: Option<String>,

    /// Tag in the mail subject; defaults to the watched user or term.
    #[arg(long, env = "POSTWATCH_SUBJECT_TAG")]
    pub subject_tag: Option<String>,

    /// Stop after this many consecutive cycles failed to save.
    #[arg(long, env = "POSTWATCH_MAX_SAVE_FAILURES")]
    pub max_save_failures: Option<u32>,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn source(&self) -> Result<Box<dyn PageSource>, ConfigurationError> {
        match (&self.target.user, &self.target.search) {
            (Some(user), None) => Ok(Box::new(UserFeedSource::with_origin(user, &self.origin)?)),
            (None, Some(term)) => Ok(Box::new(SearchFeedSource::with_origin(term, &self.origin)?)),
            _ => Err(ConfigurationError::Invalid(
                "exactly one of --user or --search is required".into(),
            )),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        let cache_settings = self.redis_host.as_ref().map(|host| CacheSettings {
            host: host.clone(),
            port: self.redis_port,
            db: self.redis_db,
            username: self.redis_username.clone(),
            password: self.redis_password.clone(),
        });
        StoreConfig {
            snapshot: self.snapshot.clone(),
            cache_url: self.redis_url.clone(),
            cache_settings,
        }
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            max_save_failures: self.max_save_failures,
        }
    }

    pub fn email_settings(&self) -> Result<EmailSettings, ConfigurationError> {
        let required = |value: &Option<String>, flag: &str| {
            value
                .clone()
                .ok_or_else(|| ConfigurationError::Invalid(format!("--sink email requires {flag}")))
        };
        let default_tag = self
            .target
            .user
            .clone()
            .or_else(|| self.target.search.clone())
            .unwrap_or_default();

        Ok(EmailSettings {
            host: required(&self.smtp_host, "--smtp-host")?,
            port: self.smtp_port,
            login: required(&self.smtp_login, "--smtp-login")?,
            password: required(&self.smtp_password, "--smtp-password")?,
            from: self.mail_from.clone(),
            to: self.mail_to.clone(),
            subject_tag: self.subject_tag.clone().unwrap_or(default_tag),
        })
    }

    /// Build the configured sink.  The email sink logs in here.
    pub fn sink(&self) -> Result<Box<dyn ActionSink>, SinkError> {
        match self.sink {
            SinkKind::Console => Ok(Box::new(ConsoleSink::new())),
            SinkKind::Email => Ok(Box::new(EmailSink::connect(self.email_settings()?)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("postwatch").chain(args.iter().copied()))
    }

    #[test]
    fn requires_exactly_one_target() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--user", "a", "--search", "b"]).is_err());
        assert!(parse(&["--user", "a"]).is_ok());
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--search", "milk chocolate"]).unwrap();
        assert_eq!(cli.interval(), Duration::from_secs(120));
        assert_eq!(cli.sink, SinkKind::Console);
        assert!(!cli.once);

        let source = cli.source().unwrap();
        assert_eq!(source.cache_key(), "milk chocolate");
        assert_eq!(source.url(), "https://twitter.com/search?f=realtime&q=milk+chocolate");
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(parse(&["--user", "a", "--interval", "0"]).is_err());
    }

    #[test]
    fn redis_host_builds_a_settings_bundle() {
        let cli = parse(&["--user", "a", "--redis-host", "cache", "--redis-db", "2"]).unwrap();
        let config = cli.store_config();
        assert_eq!(config.cache_url, None);
        let settings = config.cache_settings.unwrap();
        assert_eq!(settings.host, "cache");
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.db, 2);
    }

    #[test]
    fn redis_url_and_host_together_fail_at_construction() {
        let cli = parse(&[
            "--user",
            "a",
            "--redis-url",
            "redis://cache/",
            "--redis-host",
            "cache",
        ])
        .unwrap();
        assert!(matches!(
            cli.store_config().build("a"),
            Err(ConfigurationError::ConflictingCacheTarget)
        ));
    }

    #[test]
    fn email_settings_need_smtp_credentials() {
        let cli = parse(&["--user", "alice", "--sink", "email", "--smtp-host", "smtp.test"]).unwrap();
        assert!(cli.email_settings().is_err());

        let cli = parse(&[
            "--user",
            "alice",
            "--sink",
            "email",
            "--smtp-host",
            "smtp.test",
            "--smtp-login",
            "bot@example.com",
            "--smtp-password",
            "secret",
        ])
        .unwrap();
        let settings = cli.email_settings().unwrap();
        assert_eq!(settings.port, 587);
        assert_eq!(settings.subject_tag, "alice");
    }
}
