use std::fmt;
use std::process;

use crate::{PerfData, ServiceState, ToPerfString, Unit};

/// One line of the human readable part of the output:
/// `SERVICE STATUS: <STATE> - <label>: <value><unit>`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    state: ServiceState,
    label: String,
    value: String,
}

impl StatusLine {
    pub fn new(state: ServiceState, label: &str, value: f64, unit: Unit) -> Self {
        StatusLine {
            state,
            label: label.to_owned(),
            value: format!("{}{}", value.to_perf_string(), unit),
        }
    }

    pub fn text(state: ServiceState, label: &str, value: &str) -> Self {
        StatusLine {
            state,
            label: label.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Puts a space between value and unit, e.g. `2048 MB` instead of `2048MB`.
    pub fn spaced(mut self) -> Self {
        let split = self
            .value
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(self.value.len());
        if split < self.value.len() {
            self.value.insert(split, ' ');
        }
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SERVICE STATUS: {} - {}: {}",
            self.state, self.label, self.value
        )
    }
}

/// The result of a single check run. The overall state is the worst state of all status lines.
///
/// ```rust
/// # use check_storsafe::{PerfData, Report, ServiceState, StatusLine, Unit};
/// let mut report = Report::new();
/// report.push_line(StatusLine::new(ServiceState::Ok, "Total cache", 500.0, Unit::Gigabytes));
/// report.push_perf(PerfData::new("total_cache_gb", 500.0, Unit::Gigabytes));
///
/// assert_eq!(
///     &report.to_nagios_string(),
///     "SERVICE STATUS: OK - Total cache: 500GB | total_cache_gb=500GB"
/// );
/// assert_eq!(report.exit_code(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Report {
    lines: Vec<StatusLine>,
    perf_data: Vec<PerfData>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: StatusLine) {
        self.lines.push(line)
    }

    pub fn push_perf(&mut self, perf: PerfData) {
        self.perf_data.push(perf)
    }

    pub fn lines(&self) -> &[StatusLine] {
        &self.lines
    }

    pub fn perf_data(&self) -> &[PerfData] {
        &self.perf_data
    }

    /// Worst state of all lines. An empty report is unknown.
    pub fn state(&self) -> ServiceState {
        self.lines
            .iter()
            .map(StatusLine::state)
            .max()
            .unwrap_or(ServiceState::Unknown)
    }

    /// Returns a string which nagios understands to determine the service state.
    pub fn to_nagios_string(&self) -> String {
        let mut s = self
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        if !self.perf_data.is_empty() {
            s.push_str(" |");

            for perf in self.perf_data.iter() {
                s.push_str(&format!(" {}", perf.to_perf_string()));
            }
        }

        s
    }

    pub fn exit_code(&self) -> i32 {
        self.state().exit_code()
    }

    /// Will print Self::to_nagios_string and exit with the exit code from Self::exit_code
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_nagios_string());
        process::exit(self.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let line = StatusLine::new(ServiceState::Warning, "Used cache", 96.0, Unit::Percentage);
        assert_eq!(
            &line.to_string(),
            "SERVICE STATUS: WARNING - Used cache: 96%"
        );

        let line = StatusLine::new(ServiceState::Ok, "Used cache", 120.25, Unit::Gigabytes);
        assert_eq!(&line.to_string(), "SERVICE STATUS: OK - Used cache: 120.25GB");

        let line = StatusLine::text(ServiceState::Ok, "Local cluster", "ss-01");
        assert_eq!(&line.to_string(), "SERVICE STATUS: OK - Local cluster: ss-01");
    }

    #[test]
    fn test_spaced_status_line() {
        let line = StatusLine::new(ServiceState::Ok, "Total", 2048.5, Unit::Megabytes).spaced();
        assert_eq!(&line.to_string(), "SERVICE STATUS: OK - Total: 2048.5 MB");

        let line = StatusLine::new(ServiceState::Ok, "Ratio", 3.0, Unit::None).spaced();
        assert_eq!(&line.to_string(), "SERVICE STATUS: OK - Ratio: 3");
    }

    #[test]
    fn test_report_state() {
        let mut report = Report::new();
        assert_eq!(report.state(), ServiceState::Unknown);
        assert_eq!(report.to_nagios_string(), "");

        report.push_line(StatusLine::new(ServiceState::Ok, "a", 1.0, Unit::None));
        report.push_line(StatusLine::new(ServiceState::Critical, "b", 2.0, Unit::None));
        report.push_line(StatusLine::new(ServiceState::Warning, "c", 3.0, Unit::None));
        assert_eq!(report.state(), ServiceState::Critical);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_report_without_perf_data() {
        let mut report = Report::new();
        report.push_line(StatusLine::text(ServiceState::Ok, "Local cluster", "x"));
        assert_eq!(
            report.to_nagios_string(),
            "SERVICE STATUS: OK - Local cluster: x"
        );
    }
}
