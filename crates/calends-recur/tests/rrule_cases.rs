mod rrule_cases_data;

use rrule_cases_data::{assert_case, rrule_timestamps, rule_cases, rule_timestamps};

#[test]
fn rule_cases_match_expected() {
    for case in rule_cases() {
        assert_case(&case);
    }
}

#[test]
fn rule_cases_match_rrule_crate() {
    for case in rule_cases() {
        assert_eq!(
            rule_timestamps(&case),
            rrule_timestamps(&case),
            "Case {} differs from the rrule crate",
            case.name
        );
    }
}
