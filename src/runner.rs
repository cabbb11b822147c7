use std::fmt::Display;

use crate::{Report, ServiceState};

/// Runs a check and turns its result into plugin output.
///
/// An error never produces a partial report: it is printed as `<STATE>: <message>` and the
/// process exits with the state chosen by the `on_error` handler, unknown by default.
pub struct Runner<E> {
    on_error: Option<Box<dyn FnOnce(&E) -> ServiceState>>,
}

impl<E: Display> Runner<E> {
    pub fn new() -> Self {
        Self { on_error: None }
    }

    pub fn on_error(mut self, f: impl FnOnce(&E) -> ServiceState + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// This will run either the default `on_error` handler or the one specified by calling
    /// [on_error]. The returned [RunnerResult] holds either the report or the state and error
    /// to exit with.
    pub fn safe_run(self, f: impl FnOnce() -> Result<Report, E>) -> RunnerResult<E> {
        match f() {
            Ok(report) => RunnerResult::Ok(report),
            Err(err) => {
                let state = self
                    .on_error
                    .map(|f| f(&err))
                    .unwrap_or(ServiceState::Unknown);

                RunnerResult::Err(state, err)
            }
        }
    }
}

impl<E: Display> Default for Runner<E> {
    fn default() -> Self {
        Self::new()
    }
}

pub enum RunnerResult<E> {
    Ok(Report),
    Err(ServiceState, E),
}

impl<E: Display> RunnerResult<E> {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerResult::Ok(report) => report.exit_code(),
            RunnerResult::Err(state, _) => state.exit_code(),
        }
    }

    pub fn to_nagios_string(&self) -> String {
        match self {
            RunnerResult::Ok(report) => report.to_nagios_string(),
            RunnerResult::Err(state, err) => format!("{}: {}", state, err),
        }
    }

    pub fn print_and_exit(self) -> ! {
        println!("{}", self.to_nagios_string());
        std::process::exit(self.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::metric::MetricId;
    use crate::report::StatusLine;
    use crate::Unit;

    #[derive(Debug, thiserror::Error)]
    #[error("woops")]
    struct EmptyError;

    #[test]
    fn test_runner_ok() {
        let result = Runner::<EmptyError>::new()
            .on_error(|_| panic!("error handler called for a successful check"))
            .safe_run(|| {
                let mut report = Report::new();
                report.push_line(StatusLine::new(
                    ServiceState::Warning,
                    "Used cache",
                    96.0,
                    Unit::Percentage,
                ));
                Ok(report)
            });

        assert!(matches!(result, RunnerResult::Ok(_)));
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_runner_error_defaults_to_unknown() {
        let result = Runner::<EmptyError>::new().safe_run(|| Err(EmptyError {}));

        assert!(matches!(result, RunnerResult::Err(ServiceState::Unknown, _)));
        assert_eq!(result.to_nagios_string(), "UNKNOWN: woops");
        assert_eq!(result.exit_code(), 3);
    }

    #[test]
    fn test_runner_error_handler() {
        let result = Runner::<EmptyError>::new()
            .on_error(|_| ServiceState::Critical)
            .safe_run(|| Err(EmptyError {}));

        assert_eq!(result.to_nagios_string(), "CRITICAL: woops");
        assert_eq!(result.exit_code(), 2);
    }

    #[test]
    fn test_runner_missing_metric() {
        let result = Runner::<CheckError>::new()
            .on_error(CheckError::service_state)
            .safe_run(|| Err(CheckError::MissingMetric(MetricId::UsedCachePercent)));

        assert_eq!(
            result.to_nagios_string(),
            "UNKNOWN: At least one object returned empty."
        );
        assert_eq!(result.exit_code(), 3);
    }
}
