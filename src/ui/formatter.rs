//! Pure formatting functions for UI output.
//!
//! Rendering is split from printing so messages can be checked in tests; the
//! `display_*` functions only add styling and write to the terminal.

use console::style;

use crate::boundary::SkipReason;
use crate::cli::Plan;
use crate::domain::PublishTarget;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display why nothing was published.
pub fn display_skip(reason: &SkipReason) {
    display_status(&reason.to_string());
}

/// Describe a publish target for humans.
pub fn describe_target(target: &PublishTarget) -> String {
    match target {
        PublishTarget::Latest { dir } => format!("latest documentation into '{}/'", dir),
        PublishTarget::Tag { name } => format!("documentation for tag '{}' into '{}/'", name, name),
    }
}

/// Render the steps a dry run would perform.
pub fn render_plan(plan: &Plan, steps: &[String]) -> String {
    let mut lines = vec![format!("Would publish {}", describe_target(&plan.target))];
    let mut n = 1;

    if plan.run_generator {
        for step in steps {
            lines.push(format!(
                "  {}. run `{}` in {}",
                n,
                step,
                plan.working_dir.display()
            ));
            n += 1;
        }
    }
    lines.push(format!(
        "  {}. clean vendored assets in {}",
        n,
        plan.output_dir.display()
    ));
    lines.push(format!(
        "  {}. clone branch '{}' into {}",
        n + 1,
        plan.remote.branch,
        plan.checkout_dir.display()
    ));
    lines.push(format!(
        "  {}. replace '{}/' with the build output",
        n + 2,
        plan.target.dir_name()
    ));
    lines.push(format!(
        "  {}. commit and push to '{}' if anything changed",
        n + 3,
        plan.remote.name
    ));

    lines.join("\n")
}

/// Display a dry-run plan.
pub fn display_plan(plan: &Plan, steps: &[String]) {
    println!("\n{}", style("Dry run:").bold());
    println!("{}", render_plan(plan, steps));
}

/// Display a successful publish.
pub fn display_published(target: &PublishTarget, commit: &str) {
    let short = if commit.len() > 7 { &commit[..7] } else { commit };
    display_success(&format!(
        "Published {} (commit {})",
        describe_target(target),
        short
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::RemoteSpec;
    use std::path::PathBuf;

    fn plan(run_generator: bool) -> Plan {
        Plan {
            target: PublishTarget::Tag {
                name: "v1.2.3".to_string(),
            },
            remote: RemoteSpec {
                name: "origin".to_string(),
                url: "https://github.com/owner/repo.git".to_string(),
                branch: "gh-pages".to_string(),
            },
            working_dir: PathBuf::from("/ci/build"),
            output_dir: PathBuf::from("/ci/build/doc/html"),
            checkout_dir: PathBuf::from("/ci/gh-pages"),
            run_generator,
        }
    }

    #[test]
    fn test_describe_target() {
        assert_eq!(
            describe_target(&PublishTarget::Latest {
                dir: "latest".to_string()
            }),
            "latest documentation into 'latest/'"
        );
    }

    #[test]
    fn test_render_plan_lists_generator_steps() {
        let rendered = render_plan(&plan(true), &["make doc_html".to_string()]);
        assert!(rendered.starts_with("Would publish documentation for tag 'v1.2.3'"));
        assert!(rendered.contains("1. run `make doc_html` in /ci/build"));
        assert!(rendered.contains("3. clone branch 'gh-pages' into /ci/gh-pages"));
        assert!(rendered.contains("5. commit and push to 'origin'"));
    }

    #[test]
    fn test_render_plan_without_build() {
        let rendered = render_plan(&plan(false), &["make doc_html".to_string()]);
        assert!(!rendered.contains("make doc_html"));
        assert!(rendered.contains("1. clean vendored assets"));
    }

    #[test]
    fn test_display_functions() {
        // Visual verification test - output is printed to stdout/stderr
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_skip(&SkipReason::PullRequest);
    }
}
