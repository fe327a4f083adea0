//! CSV output formatting for verdicts.

use super::terminal::format_field;
use crate::engine::Classification;
use crate::policy::Verdict;

/// Print a classification as CSV to stdout.
pub fn print_verdicts_csv(classification: &Classification) {
    log::info!(
        "#Start print_verdicts_csv() policy={policy} verdicts={count}",
        policy = classification.policy,
        count = classification.verdicts.len()
    );

    println!(
        r#" "cnt",         "policy",      "outcome",                  "reason",                 "vnet_name",              "subnet_name",  "udr","inet_route","nva_gw_route","nat_gw","lb_outbound","nic_pip","default_outbound""#
    );

    for (i, verdict) in classification.verdicts.iter().enumerate() {
        print_csv_row(i + 1, verdict);
    }
}

/// Print a single CSV row.
fn print_csv_row(cnt: usize, v: &Verdict) {
    println!(
        r#"{cnt},{policy},{outcome},{reason},{vnet_name},{subnet_name},{udr},{inet},{nva_gw},{nat},{lb},{pip},{doa}"#,
        cnt = format_field(cnt, 6),
        policy = format_field(v.policy, 17),
        outcome = format_field(v.outcome, 14),
        reason = format_field(v.reason.as_deref().unwrap_or(""), 26),
        vnet_name = format_field(&v.vnet_name, 27),
        subnet_name = format_field(&v.subnet_name, 27),
        udr = format_field(v.has_udr, 6),
        inet = format_field(v.has_internet_default_route, 12),
        nva_gw = format_field(v.has_appliance_or_gateway_default_route, 14),
        nat = format_field(v.has_nat_gateway, 8),
        lb = format_field(v.has_lb_outbound_rule, 13),
        pip = format_field(v.has_nic_public_ip, 9),
        doa = format_field(
            v.default_outbound_access
                .map(|b| b.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            18
        ),
    );
}
