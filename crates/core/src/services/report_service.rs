use std::fmt::Write;

use crate::models::metrics::Calculated;
use crate::models::portfolio::Portfolio;

/// Renders the computed metrics as a plain-text diagnostic report, the
/// summary handed to the analysis collaborator.
///
/// This is the presentation boundary: amounts are rounded to whole currency
/// units and percents to one decimal here, never earlier.
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    pub fn portfolio_summary(&self, portfolio: &Portfolio, calculated: &Calculated) -> String {
        let mut out = String::new();

        // `write!` into a String cannot fail.
        let _ = writeln!(out, "# Portfolio Diagnostic");
        let _ = writeln!(out);
        let _ = writeln!(out, "## Macro Settings");
        let _ = writeln!(out, "- Planned total: {}", format_amount(calculated.planned_total));
        let _ = writeln!(out, "- Total invested: {}", format_amount(calculated.total_invested));
        let _ = writeln!(
            out,
            "- Cash reserve (dry powder): {}",
            format_amount(calculated.total_cash)
        );
        let _ = writeln!(out, "- Position: {:.1}%", calculated.position_percent);

        let _ = writeln!(out);
        let _ = writeln!(out, "## Groups");
        for group in &portfolio.groups {
            let Some(m) = calculated.group(&group.id) else {
                continue;
            };
            let direction = if m.is_underweight() {
                "buy"
            } else if m.gap < 0.0 {
                "trim"
            } else {
                "on target"
            };
            let _ = writeln!(
                out,
                "- {} [{}]: target {}% ({}), current {}, gap {} ({direction}), completion {:.1}%",
                group.name,
                group.view_type,
                format_percent(group.target_percent),
                format_amount(m.target),
                format_amount(m.current),
                format_amount(m.gap),
                m.completion,
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Assets");
        for asset in &portfolio.assets {
            let tags = portfolio.tag_names(asset);
            let _ = write!(
                out,
                "- {}: value {}, target {}%",
                asset.name,
                format_amount(asset.value),
                format_percent(asset.target_percent),
            );
            if !tags.is_empty() {
                let _ = write!(out, " (tags: {})", tags.join(", "));
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Tag Distribution");
        for tag in &calculated.tag_metrics {
            let _ = writeln!(
                out,
                "- {}: {:.1}%, value {}",
                tag.name,
                tag.percent,
                format_amount(tag.value)
            );
        }

        out.trim_end().to_string()
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to a whole currency unit and group thousands: `-195000.4` -> `-195,000`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    // Avoid printing "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Whole percents print without decimals, fractional ones with up to two.
fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
