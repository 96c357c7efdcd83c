// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.0.0
//
// This file defines core data structures for the stratum miner, located in the
// core subdirectory. It includes the command-line arguments, pool jobs and
// shares, and the conversions from arguments into the runtime configuration
// of the pool client, the worker pool and the logger.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde

use crate::core::difficulty::{TargetError, parse_target_difficulty};
use crate::logging::LogSettings;
use crate::miner::MinerConfig;
use crate::miner::error::ConfigError;
use crate::pool::{PoolEndpoint, StratumConfig};
use crate::utils::address::validate_address;
use crate::utils::user_agent::user_agent;
use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the stratum miner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stratum-miner",
    version,
    about = "Stratum pool miner with a multi-threaded CPU search engine",
    long_about = "Connects to a stratum mining pool, receives jobs and searches them on\n\
                  every configured CPU thread, submitting shares that meet the pool difficulty.\n\n\
                  Examples:\n\
                    Plain TCP:  stratum-miner -u dero1qy... -o pool.example.com:10100 -t 8\n\
                    TLS pool:   stratum-miner -u dero1qy... -o stratum+tls://pool.example.com:10300\n\
                    Testnet:    stratum-miner -u deto1qy... -o 127.0.0.1:10100 --testnet --debug"
)]
pub struct Args {
    /// Wallet address used as the pool login, optionally suffixed with `.worker`
    #[arg(short = 'u', long = "wallet", value_name = "ADDRESS", help = "Wallet address for mining rewards")]
    pub wallet: String,

    /// Pool URL: host:port, stratum+tcp://host:port or stratum+tls://host:port
    #[arg(short = 'o', long = "pool", value_name = "URL", help = "Mining pool URL")]
    pub pool: String,

    /// Pool password, usually empty
    #[arg(short = 'p', long = "password", value_name = "PASSWORD", default_value = "")]
    pub password: String,

    /// Agent string sent with the login
    #[arg(long, value_name = "AGENT", default_value_t = user_agent())]
    pub agent: String,

    /// Number of CPU mining threads
    /// 0 = one per available CPU
    #[arg(short, long, default_value = "0", value_name = "COUNT", help = "Number of CPU threads (0 = auto-detect)")]
    pub threads: usize,

    /// Validate the wallet against the test network
    #[arg(long, default_value = "false")]
    pub testnet: bool,

    /// Skip TLS certificate verification for stratum+tls pools
    #[arg(long = "insecure-skip-verify", default_value = "false")]
    pub insecure_skip_verify: bool,

    /// Lower console and file log levels to debug
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Console log level: off, error, warn, info, debug or trace
    #[arg(long = "console-log-level", default_value = "info", value_name = "LEVEL")]
    pub console_log_level: LevelFilter,

    /// Log file level: off, error, warn, info, debug or trace
    #[arg(long = "file-log-level", default_value = "info", value_name = "LEVEL")]
    pub file_log_level: LevelFilter,

    /// Log file path, defaults to `<executable>.log`
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable the log file entirely
    #[arg(long = "no-log-file", default_value = "false", conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Read deadline in seconds applied to every pool read
    #[arg(long = "read-timeout", default_value = "10", value_name = "SECONDS")]
    pub read_timeout: u64,

    /// Write deadline in seconds applied to every pool write
    #[arg(long = "write-timeout", default_value = "10", value_name = "SECONDS")]
    pub write_timeout: u64,

    /// Minimum reconnect delay in seconds
    #[arg(long = "reconnect-min", default_value = "1", value_name = "SECONDS")]
    pub reconnect_min: u64,

    /// Maximum reconnect delay in seconds
    #[arg(long = "reconnect-max", default_value = "30", value_name = "SECONDS")]
    pub reconnect_max: u64,

    /// Multiplier applied to the reconnect delay after each failed dial
    #[arg(long = "reconnect-factor", default_value = "1.5", value_name = "FACTOR")]
    pub reconnect_factor: f64,

    /// Seconds between hashrate reports to the pool
    #[arg(long = "report-interval", default_value = "30", value_name = "SECONDS")]
    pub report_interval: u64,
}

impl Args {
    /// Validate arguments, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_address(&self.wallet, self.testnet)?;

        PoolEndpoint::parse(&self.pool).map_err(|e| ConfigError::InvalidPool(e.to_string()))?;

        if self.read_timeout == 0 {
            return Err(ConfigError::InvalidSetting("read timeout must be greater than 0 seconds"));
        }
        if self.write_timeout == 0 {
            return Err(ConfigError::InvalidSetting("write timeout must be greater than 0 seconds"));
        }
        if self.reconnect_min == 0 || self.reconnect_max < self.reconnect_min {
            return Err(ConfigError::InvalidSetting(
                "reconnect delays must satisfy 0 < reconnect-min <= reconnect-max",
            ));
        }
        if !(self.reconnect_factor >= 1.0 && self.reconnect_factor.is_finite()) {
            return Err(ConfigError::InvalidSetting("reconnect factor must be at least 1.0"));
        }
        if self.report_interval == 0 {
            return Err(ConfigError::InvalidSetting("report interval must be greater than 0 seconds"));
        }

        let available = num_cpus::get();
        if self.threads > available {
            return Err(ConfigError::TooManyThreads {
                requested: self.threads,
                available,
            });
        }

        Ok(())
    }

    /// Resolve `--threads 0` to the number of available CPUs
    pub fn thread_count(&self) -> usize {
        match self.threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    pub fn stratum_config(&self) -> StratumConfig {
        StratumConfig {
            url: self.pool.clone(),
            username: self.wallet.clone(),
            password: self.password.clone(),
            agent: self.agent.clone(),
            insecure_skip_verify: self.insecure_skip_verify,
            read_timeout: Duration::from_secs(self.read_timeout),
            write_timeout: Duration::from_secs(self.write_timeout),
            reconnect_min: Duration::from_secs(self.reconnect_min),
            reconnect_max: Duration::from_secs(self.reconnect_max),
            reconnect_factor: self.reconnect_factor,
            ..StratumConfig::default()
        }
    }

    pub fn miner_config(&self) -> MinerConfig {
        MinerConfig {
            threads: self.thread_count(),
            report_interval: Duration::from_secs(self.report_interval),
            ..MinerConfig::default()
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        let file = if self.no_log_file {
            None
        } else {
            Some(self.log_file.clone().unwrap_or_else(LogSettings::default_log_path))
        };
        let settings = LogSettings {
            console_level: self.console_log_level,
            file_level: self.file_log_level,
            file,
        };
        if self.debug { settings.with_debug() } else { settings }
    }
}

/// Job fields as sent by the pool, in the login result and in `job` notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    pub job_id: String,
    pub blob: String,
    pub height: u64,
    pub extra_nonce: String,
    pub pool_wallet: String,
    pub target: String,
}

/// A validated unit of work. Never mutated; a new job replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub blob: String,
    pub height: u64,
    pub extra_nonce: String,
    pub pool_wallet: String,
    pub target: String,
    /// Derived from `target`, always non-zero
    pub difficulty: u64,
}

impl TryFrom<JobParams> for Job {
    type Error = TargetError;

    fn try_from(params: JobParams) -> Result<Self, Self::Error> {
        let difficulty = parse_target_difficulty(&params.target)?;
        Ok(Self {
            id: params.job_id,
            blob: params.blob,
            height: params.height,
            extra_nonce: params.extra_nonce,
            pool_wallet: params.pool_wallet,
            target: params.target,
            difficulty,
        })
    }
}

/// Represents a found share ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// Job ID this share is for
    pub job_id: String,

    /// Hex of the salt, nonce and worker id bytes of the work buffer
    pub nonce: String,

    /// Hex of the resulting hash
    pub result: String,
}

impl Share {
    pub fn new(job_id: impl Into<String>, nonce: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            nonce: nonce.into(),
            result: result.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(target: &str) -> JobParams {
        JobParams {
            job_id: "job-1".into(),
            blob: "00".repeat(48),
            height: 42,
            extra_nonce: "abcd".into(),
            pool_wallet: "dero1pool".into(),
            target: target.into(),
        }
    }

    #[test]
    fn test_job_from_params_derives_difficulty() {
        let job = Job::try_from(params("0200000000000000")).unwrap();
        assert_eq!(job.id, "job-1");
        assert_eq!(job.height, 42);
        assert_eq!(job.difficulty, 9223372036854775807);
    }

    #[test]
    fn test_job_with_zero_target_is_rejected() {
        assert_eq!(Job::try_from(params("0000000000000000")), Err(TargetError::Zero));
    }

    #[test]
    fn test_job_params_require_every_field() {
        let missing_target = r#"{"job_id":"a","blob":"00","height":1,"extra_nonce":"","pool_wallet":""}"#;
        assert!(serde_json::from_str::<JobParams>(missing_target).is_err());
    }

    const WALLET: &str = "dero1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7ruszzgs9jezes";

    #[test]
    fn test_args_conversions() {
        let args = Args::parse_from([
            "stratum-miner",
            "-u",
            WALLET,
            "-o",
            "stratum+tls://pool.example.com:10300",
            "-t",
            "1",
            "--read-timeout",
            "5",
            "--no-log-file",
        ]);
        assert_eq!(args.thread_count(), 1);

        let stratum = args.stratum_config();
        assert_eq!(stratum.url, "stratum+tls://pool.example.com:10300");
        assert_eq!(stratum.username, WALLET);
        assert_eq!(stratum.read_timeout, Duration::from_secs(5));
        assert_eq!(stratum.write_timeout, Duration::from_secs(10));

        assert!(args.log_settings().file.is_none());
        assert_eq!(args.log_settings().console_level, LevelFilter::Info);
        assert_eq!(args.miner_config().threads, 1);
    }

    #[test]
    fn test_log_levels_from_args() {
        let args = Args::parse_from([
            "stratum-miner",
            "-u",
            WALLET,
            "-o",
            "pool.example.com:10100",
            "--console-log-level",
            "warn",
            "--file-log-level",
            "trace",
            "--log-file",
            "miner.log",
        ]);
        let settings = args.log_settings();
        assert_eq!(settings.console_level, LevelFilter::Warn);
        assert_eq!(settings.file_level, LevelFilter::Trace);
        assert_eq!(settings.file, Some(PathBuf::from("miner.log")));

        let args = Args::parse_from(["stratum-miner", "-u", WALLET, "-o", "pool.example.com:10100", "--debug"]);
        let settings = args.log_settings();
        assert_eq!(settings.console_level, LevelFilter::Debug);
        assert_eq!(settings.file_level, LevelFilter::Debug);

        assert!(Args::try_parse_from(["stratum-miner", "-u", WALLET, "-o", "p:1", "--console-log-level", "loud"]).is_err());
    }

    #[test]
    fn test_args_validation_rejects_bad_settings() {
        let base = Args::parse_from(["stratum-miner", "-u", WALLET, "-o", "pool.example.com:10100"]);
        assert!(base.validate().is_ok());

        let mut bad = base.clone();
        bad.pool = "pool.example.com".into();
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidPool(_))));

        let mut bad = base.clone();
        bad.reconnect_factor = 0.5;
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidSetting(_))));

        let mut bad = base.clone();
        bad.threads = num_cpus::get() + 1;
        assert!(matches!(bad.validate(), Err(ConfigError::TooManyThreads { .. })));

        let mut bad = base;
        bad.testnet = true;
        assert!(matches!(bad.validate(), Err(ConfigError::Address(_))));
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Args now carries pool URL schemes, TLS, timeouts, backoff and logging
//     options; validation reports typed configuration errors.
//   - Replaced PoolJob/MiningJob with JobParams and an immutable Job whose
//     difficulty is derived from the target and fails closed.
//   - Share carries hex nonce and result strings as submitted to the pool.
//   - Removed benchmark, SV2 and web dashboard arguments.
