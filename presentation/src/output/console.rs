//! Console output formatter for supervision results

use colored::Colorize;
use marionette_application::SupervisorStatus;
use marionette_domain::{DriftReport, Intervention};

/// Formats supervision output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Session banner printed at startup
    pub fn banner() -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str("+============================================================+\n");
        output.push_str("|        Marionette - Coding Agent Supervision               |\n");
        output.push_str("+============================================================+\n");
        output
    }

    /// The `/status` block
    pub fn status(status: &SupervisorStatus) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", "SESSION STATUS".cyan().bold()));
        output.push_str(&format!("Session ID:     {}\n", status.session_id));
        output.push_str(&format!("User inputs:    {}\n", status.user_inputs));
        output.push_str(&format!("Agent outputs:  {}\n", status.agent_outputs));
        output.push_str(&format!("Errors tracked: {}\n", status.errors_tracked));
        output
    }

    /// The `/stats` block: per-monitor detection counters
    pub fn stats(status: &SupervisorStatus) -> String {
        let monitors = &status.monitors;
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", "DETECTION STATISTICS".cyan().bold()));
        output.push_str(&format!(
            "Debug loops:    {} detections\n",
            monitors.debug_loops.total_detections
        ));
        output.push_str(&format!(
            "Context drift:  {} events (goal learned: {})\n",
            monitors.context_drift.drift_events,
            if monitors.context_drift.has_learned_goal {
                "yes"
            } else {
                "not yet"
            }
        ));
        output.push_str(&format!(
            "Sycophancy:     {} detections\n",
            monitors.sycophancy.total_detections
        ));
        output.push_str(&format!(
            "Interventions:  {}\n",
            monitors.interventions_made
        ));
        output
    }

    /// A rejected prompt with feedback and suggestions
    pub fn rejection(feedback: &str, suggestions: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{}\n",
            "PROMPT QUALITY CHECK FAILED".yellow().bold()
        ));
        output.push_str(&format!("Feedback: {}\n", feedback));
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }
        output
    }

    /// Warnings and suggestions attached to an intervention
    pub fn intervention(intervention: &Intervention) -> String {
        let mut output = String::new();
        if !intervention.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "MARIONETTE WARNINGS".yellow().bold()));
            for warning in &intervention.warnings {
                output.push_str(&format!("  {}\n", warning.yellow()));
            }
        }
        if !intervention.suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "MARIONETTE SUGGESTIONS".cyan().bold()));
            for suggestion in &intervention.suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }
        if intervention.kill_agent {
            output.push_str(&format!(
                "\n{}\n",
                "AGENT KILLED - Debug loop detected".red().bold()
            ));
        }
        output
    }

    /// A context drift report from the background watch
    pub fn drift(report: &DriftReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", "CONTEXT DRIFT WARNING".yellow().bold()));
        output.push_str(&format!("  Initial goal:       {}\n", report.initial_goal));
        output.push_str(&format!(
            "  Current trajectory: {}\n",
            report.current_trajectory
        ));
        output.push_str(&format!("  Distance:           {:.2}\n", report.distance));
        output.push_str(&format!(
            "  Recommendation:     {}\n",
            report.recommendation
        ));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_lists_numbered_suggestions() {
        let text = ConsoleFormatter::rejection(
            "Too vague",
            &["Name the file".to_string(), "State the goal".to_string()],
        );
        assert!(text.contains("Too vague"));
        assert!(text.contains("1. Name the file"));
        assert!(text.contains("2. State the goal"));
    }

    #[test]
    fn intervention_sections_appear_when_populated() {
        let intervention = Intervention {
            kill_agent: true,
            warnings: vec!["Debug loop detected: same error".to_string()],
            suggestions: vec!["pivot now".to_string()],
        };
        let text = ConsoleFormatter::intervention(&intervention);
        assert!(text.contains("MARIONETTE WARNINGS"));
        assert!(text.contains("MARIONETTE SUGGESTIONS"));
        assert!(text.contains("AGENT KILLED"));
    }

    #[test]
    fn empty_intervention_renders_nothing() {
        assert!(ConsoleFormatter::intervention(&Intervention::default()).is_empty());
    }

    #[test]
    fn drift_report_shows_distance() {
        let report = DriftReport {
            initial_goal: "build the API".to_string(),
            current_trajectory: "styling CSS".to_string(),
            distance: 0.85,
            recommendation: "return to the endpoints".to_string(),
        };
        let text = ConsoleFormatter::drift(&report);
        assert!(text.contains("0.85"));
        assert!(text.contains("styling CSS"));
    }
}
