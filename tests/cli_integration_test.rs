//! CLI integration tests for configuration handling and command dispatch.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config, build_strategy_params, build_run_request)
//! - Validation of real INI files on disk
//! - Full pipeline against CSV files in a temp directory, both run modes
//! - Exit codes of the backtest, validate and list commands

mod common;

use common::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tradesim::adapters::csv_adapter::CsvAdapter;
use tradesim::adapters::file_config_adapter::FileConfigAdapter;
use tradesim::cli::{self, Cli, Command};
use tradesim::domain::backtest::{BacktestConfig, RunMode, VectorizedBacktester};
use tradesim::domain::error::TradesimError;
use tradesim::domain::strategy::{
    Precomputed, SmaCrossover, StrategyKind, WindowedSmaCrossover,
};
use tradesim::domain::timeframe::Timeframe;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn exit_code_text(code: ExitCode) -> String {
    format!("{code:?}")
}

fn ini_for(data_dir: &Path, extra_backtest: &str) -> String {
    format!(
        r#"
[data]
dir = {}

[backtest]
ticker = eurusd
timeframe = 1d
risk_free_rate = 0.02
lookback = 10
{}

[strategy]
kind = sma_crossover
name = Cross 3/8
fast = 3
slow = 8
"#,
        data_dir.display(),
        extra_backtest
    )
}

/// Temp data directory holding `EURUSD_1d.csv` with a 200-bar wave.
fn seeded_data_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    CsvAdapter::new(dir.path().to_path_buf())
        .write_series("EURUSD", Timeframe::Daily, &make_series(&wave_closes(200)))
        .unwrap();
    dir
}

const VALID_INI: &str = r#"
[data]
dir = /var/lib/tradesim

[backtest]
ticker = gbpusd
timeframe = 1w
mode = windowed
lookback = 30
risk_free_rate = 0.03
start_date = 2020-01-01
end_date = 2024-12-31

[strategy]
kind = sma_crossover
name = Weekly Cross
fast = 10
slow = 40

[report]
path = /tmp/report.txt
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(config.timeframe, Timeframe::Weekly);
        assert_eq!(config.lookback, 30);
        assert!((config.risk_free_rate - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nticker = X\n").unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert_eq!(config, BacktestConfig::default());
    }

    #[test]
    fn build_backtest_config_rejects_unknown_timeframe() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ntimeframe = 4h\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidInput { .. }));
    }

    #[test]
    fn build_backtest_config_rejects_negative_lookback() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nlookback = -3\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, TradesimError::ConfigInvalid { key, .. } if key == "lookback"));
    }

    #[test]
    fn build_run_request_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let request = cli::build_run_request(&adapter).unwrap();

        assert_eq!(request.ticker, "GBPUSD");
        assert_eq!(request.mode, RunMode::Windowed);
        assert_eq!(request.start, Some(date(2020, 1, 1)));
        assert_eq!(request.end, Some(date(2024, 12, 31)));
        assert_eq!(request.strategy.name, "Weekly Cross");
    }

    #[test]
    fn build_run_request_missing_ticker() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nlookback = 5\n").unwrap();
        let err = cli::build_run_request(&adapter).unwrap_err();
        assert!(matches!(err, TradesimError::ConfigMissing { key, .. } if key == "ticker"));
    }

    #[test]
    fn build_run_request_invalid_date_format() {
        let ini = "[backtest]\nticker = X\nstart_date = 2020/01/01\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_run_request(&adapter).unwrap_err();
        assert!(matches!(err, TradesimError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn build_run_request_unknown_mode() {
        let ini = "[backtest]\nticker = X\nmode = streaming\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        assert!(cli::build_run_request(&adapter).is_err());
    }
}

mod strategy_parsing {
    use super::*;

    #[test]
    fn build_strategy_params_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let params = cli::build_strategy_params(&adapter).unwrap();

        assert_eq!(params.kind, StrategyKind::SmaCrossover);
        assert_eq!(params.name, "Weekly Cross");
        assert_eq!((params.fast, params.slow), (10, 40));
    }

    #[test]
    fn build_strategy_params_defaults() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        let params = cli::build_strategy_params(&adapter).unwrap();

        assert_eq!(params.kind, StrategyKind::SmaCrossover);
        assert_eq!(params.name, "sma_crossover");
        assert_eq!((params.fast, params.slow), (5, 20));
    }

    #[test]
    fn build_strategy_params_blank_name_falls_back_to_kind() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nname =   \n").unwrap();
        let params = cli::build_strategy_params(&adapter).unwrap();
        assert_eq!(params.name, "sma_crossover");
    }

    #[test]
    fn build_strategy_params_unknown_kind() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nkind = momentum\n").unwrap();
        let err = cli::build_strategy_params(&adapter).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidInput { .. }));
    }
}

/// Temp data directory holding `EURUSD_1d.csv` with closes SMA(1, 2) trades
/// to a defined summary.
fn tick_data_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    CsvAdapter::new(dir.path().to_path_buf())
        .write_series("EURUSD", Timeframe::Daily, &make_series(&tick_closes()))
        .unwrap();
    dir
}

fn tick_ini(data_dir: &Path) -> String {
    ini_for(data_dir, "")
        .replace("fast = 3", "fast = 1")
        .replace("slow = 8", "slow = 2")
}

mod csv_pipeline {
    use super::*;

    #[test]
    fn vectorized_pipeline_reads_csv() {
        let dir = tick_data_dir();
        let adapter = FileConfigAdapter::from_string(&tick_ini(dir.path())).unwrap();
        let request = cli::build_run_request(&adapter).unwrap();
        let port = CsvAdapter::new(dir.path().to_path_buf());

        let result = cli::run_backtest_pipeline(&port, &request).unwrap();
        let series = make_series(&tick_closes());
        let direct = VectorizedBacktester::new(&series, BacktestConfig::default())
            .run(&SmaCrossover::new(1, 2))
            .unwrap();

        assert_eq!(result.strategy(), "Cross 3/8");
        assert_eq!(result.trades(), direct.trades());
        assert_eq!(result.summary(), direct.summary());
    }

    #[test]
    fn windowed_pipeline_reads_csv() {
        let dir = seeded_data_dir();
        let ini = ini_for(dir.path(), "mode = windowed");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let request = cli::build_run_request(&adapter).unwrap();
        assert_eq!(request.mode, RunMode::Windowed);

        let outcome =
            cli::run_backtest_pipeline(&CsvAdapter::new(dir.path().to_path_buf()), &request);
        let series = make_series(&wave_closes(200));
        let direct = VectorizedBacktester::new(&series, BacktestConfig::default()).run(
            &Precomputed::new(WindowedSmaCrossover::new(3, 8).with_name("Cross 3/8"), 10),
        );
        assert_eq!(format!("{outcome:?}"), format!("{direct:?}"));
    }

    #[test]
    fn pipeline_date_range_narrows_series() {
        let dir = seeded_data_dir();
        let ini = ini_for(dir.path(), "start_date = 2024-02-01\nend_date = 2024-02-29");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let request = cli::build_run_request(&adapter).unwrap();

        let outcome =
            cli::run_backtest_pipeline(&CsvAdapter::new(dir.path().to_path_buf()), &request);
        // 2024-02-01 is day 31, 2024-02-29 is day 59
        let february = make_series(&wave_closes(200)[31..=59]);
        let direct = VectorizedBacktester::new(&february, BacktestConfig::default())
            .run(&SmaCrossover::new(3, 8).with_name("Cross 3/8"));
        assert_eq!(format!("{outcome:?}"), format!("{direct:?}"));
    }

    #[test]
    fn pipeline_missing_file_is_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let adapter = FileConfigAdapter::from_string(&ini_for(dir.path(), "")).unwrap();
        let request = cli::build_run_request(&adapter).unwrap();

        let err = cli::run_backtest_pipeline(&CsvAdapter::new(dir.path().to_path_buf()), &request)
            .unwrap_err();
        assert!(matches!(err, TradesimError::NoData { ticker, .. } if ticker == "EURUSD"));
    }
}

mod request_warnings {
    use super::*;

    fn request(mode: &str, lookback: usize, fast: usize, slow: usize) -> cli::RunRequest {
        let ini = format!(
            "[backtest]\nticker = X\nmode = {mode}\nlookback = {lookback}\n\n\
             [strategy]\nfast = {fast}\nslow = {slow}\n"
        );
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        cli::build_run_request(&adapter).unwrap()
    }

    #[test]
    fn sensible_request_has_no_warnings() {
        assert!(request("windowed", 30, 5, 20).warnings().is_empty());
    }

    #[test]
    fn windowed_slow_period_beyond_lookback_warns() {
        let warnings = request("windowed", 10, 3, 20).warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("slow period 20 exceeds lookback 10"));
    }

    #[test]
    fn vectorized_ignores_lookback() {
        assert!(request("vectorized", 10, 3, 20).warnings().is_empty());
    }

    #[test]
    fn fast_not_shorter_than_slow_warns() {
        let warnings = request("vectorized", 10, 8, 8).warnings();
        assert_eq!(
            warnings,
            vec!["fast period 8 is not shorter than slow period 8".to_string()]
        );
    }
}

mod commands {
    use super::*;

    fn backtest(config: &Path, output: Option<PathBuf>) -> ExitCode {
        cli::run(Cli {
            command: Command::Backtest {
                config: config.to_path_buf(),
                ticker: None,
                mode: None,
                output,
            },
        })
    }

    fn validate(config: &Path) -> ExitCode {
        cli::run(Cli {
            command: Command::Validate {
                config: config.to_path_buf(),
            },
        })
    }

    #[test]
    fn backtest_writes_report() {
        let dir = tick_data_dir();
        let file = write_temp_ini(&tick_ini(dir.path()));
        let output = dir.path().join("report.txt");

        let code = backtest(file.path(), Some(output.clone()));
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::SUCCESS));

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("Strategy: Cross 3/8"));
        assert!(content.contains("bars"));
        assert!(content.contains("== Trades (5) =="));
    }

    #[test]
    fn backtest_without_trades_exits_degenerate_without_report() {
        let dir = tempfile::TempDir::new().unwrap();
        CsvAdapter::new(dir.path().to_path_buf())
            .write_series("EURUSD", Timeframe::Daily, &make_series(&[5.0; 30]))
            .unwrap();
        let file = write_temp_ini(&ini_for(dir.path(), ""));
        let output = dir.path().join("flat.txt");

        let code = backtest(file.path(), Some(output.clone()));

        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::from(6)));
        assert!(!output.exists());
    }

    #[test]
    fn backtest_missing_data_exits_data_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = write_temp_ini(&ini_for(dir.path(), ""));
        let code = backtest(file.path(), None);
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::from(3)));
    }

    #[test]
    fn validate_valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        let code = validate(file.path());
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::SUCCESS));
    }

    #[test]
    fn validate_missing_file_fails() {
        let code = validate(Path::new("/nonexistent/path/config.ini"));
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::from(2)));
    }

    #[test]
    fn validate_out_of_range_rate_fails() {
        let ini = VALID_INI.replace("risk_free_rate = 0.03", "risk_free_rate = 1.5");
        let file = write_temp_ini(&ini);
        let code = validate(file.path());
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::from(2)));
    }

    #[test]
    fn validate_malformed_lookback_fails() {
        let ini = VALID_INI.replace("lookback = 30", "lookback = abc");
        let file = write_temp_ini(&ini);
        let code = validate(file.path());
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::from(2)));
    }

    #[test]
    fn list_succeeds_on_seeded_dir() {
        let dir = seeded_data_dir();
        let file = write_temp_ini(&ini_for(dir.path(), ""));
        let code = cli::run(Cli {
            command: Command::List {
                config: file.path().to_path_buf(),
            },
        });
        assert_eq!(exit_code_text(code), exit_code_text(ExitCode::SUCCESS));
    }
}
