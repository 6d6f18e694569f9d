use crate::analytics::{AgentSummary, Analytics};
use crate::model::TestResult;

pub fn print_results(results: &[TestResult]) {
    let mut passed = 0;
    let mut failed = 0;
    let mut errored = 0;

    eprintln!("\nAdministered {} custody test(s)", results.len());

    for r in results {
        let label = format!("{} [{}/{}]", r.ai_type, r.test_category, r.difficulty);
        match (&r.error, r.passed) {
            (Some(err), _) => {
                errored += 1;
                eprintln!("💥 {:<44} ERROR: {}", label, err);
            }
            (None, true) => {
                passed += 1;
                eprintln!("✅ {:<44} {:>6.2}  +{} xp", label, r.score, r.xp_awarded);
            }
            (None, false) => {
                failed += 1;
                eprintln!("❌ {:<44} {:>6.2}  +{} xp", label, r.score, r.xp_awarded);
            }
        }
        eprintln!("    id: {}", r.test_id);
    }

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} passed, {} failed, {} error",
        passed, failed, errored
    );
}

pub fn print_status(s: &AgentSummary) {
    eprintln!("Agent:        {} ({})", s.agent_type, s.agent_id);
    eprintln!(
        "Level:        {} (custody xp {}, total xp {}, prestige {})",
        s.custody_level, s.custody_xp, s.xp, s.prestige
    );
    eprintln!("Difficulty:   {}", s.current_difficulty);
    eprintln!(
        "Tests:        {} given, {} passed, {} failed ({:.0}% pass rate)",
        s.total_tests_given,
        s.total_tests_passed,
        s.total_tests_failed,
        s.pass_rate * 100.0
    );
    eprintln!(
        "Streak:       {} success / {} failure",
        s.consecutive_successes, s.consecutive_failures
    );
    eprintln!(
        "Last test:    {}",
        s.last_test_date.as_deref().unwrap_or("never")
    );
    eprintln!(
        "Eligible:     level up {}, proposals {}",
        yes_no(s.eligibility.can_level_up),
        yes_no(s.eligibility.can_create_proposals)
    );
}

pub fn print_analytics(a: &Analytics) {
    eprintln!(
        "Tests: {} total, {} passed, {} failed ({:.0}% pass rate)",
        a.total_tests,
        a.passed_tests,
        a.failed_tests,
        a.pass_rate * 100.0
    );
    eprintln!(
        "Agents: {} (average level {:.1}), average score {:.2}",
        a.total_agents, a.average_level, a.average_score
    );

    if !a.agents.is_empty() {
        eprintln!();
        for s in a.agents.values() {
            eprintln!(
                "  {:<12} level {:>3}  {:>4}/{:<4} passed  level-up {}  proposals {}",
                s.agent_type,
                s.custody_level,
                s.total_tests_passed,
                s.total_tests_given,
                yes_no(s.eligibility.can_level_up),
                yes_no(s.eligibility.can_create_proposals)
            );
        }
    }

    if !a.recent_tests.is_empty() {
        eprintln!("\nRecent tests:");
        for t in &a.recent_tests {
            let icon = if t.passed { "✅" } else { "❌" };
            eprintln!(
                "  {} {}  {:<10} {:<26} {:>6.2}",
                icon, t.timestamp, t.ai_type, t.test_category, t.score
            );
        }
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
