//! Payroll entry models.
//!
//! A [`PayrollEntry`] is the final per-employee, per-period result: gross pay, the
//! nine itemized deductions, their total and the resulting net pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::WeekId;

/// The four mandated weekly deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatutoryDeductions {
    /// Social Security System contribution.
    pub sss: Decimal,
    /// PhilHealth contribution.
    pub philhealth: Decimal,
    /// Pag-IBIG fund contribution.
    pub pagibig: Decimal,
    /// Withholding tax.
    pub withholding_tax: Decimal,
}

impl StatutoryDeductions {
    /// Sum of the four deductions.
    pub fn total(&self) -> Decimal {
        self.sss + self.philhealth + self.pagibig + self.withholding_tax
    }

    /// The deductions as `(field, amount)` pairs.
    pub fn items(&self) -> [(&'static str, Decimal); 4] {
        [
            ("sss", self.sss),
            ("philhealth", self.philhealth),
            ("pagibig", self.pagibig),
            ("withholding_tax", self.withholding_tax),
        ]
    }
}

/// Caller-supplied deductions that are not derived by formula.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AdHocDeductions;
/// use rust_decimal::Decimal;
///
/// let ad_hoc = AdHocDeductions {
///     cash_advance: Decimal::new(500, 0),
///     loan: Decimal::new(250, 0),
///     ..Default::default()
/// };
/// assert_eq!(ad_hoc.total(), Decimal::new(750, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdHocDeductions {
    /// Repayment of a cash advance.
    pub cash_advance: Decimal,
    /// Loan amortization.
    pub loan: Decimal,
    /// VAT withheld.
    pub vat: Decimal,
    /// Any other deduction.
    pub other: Decimal,
    /// Cost-center-specific shortage deduction; zero outside that cost center.
    pub short: Decimal,
}

impl AdHocDeductions {
    /// Sum of the five deductions.
    pub fn total(&self) -> Decimal {
        self.cash_advance + self.loan + self.vat + self.other + self.short
    }

    /// The deductions as `(field, amount)` pairs.
    pub fn items(&self) -> [(&'static str, Decimal); 5] {
        [
            ("cash_advance", self.cash_advance),
            ("loan", self.loan),
            ("vat", self.vat),
            ("other", self.other),
            ("short", self.short),
        ]
    }
}

/// Approval status of a payroll entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Generated, awaiting approval.
    #[default]
    Pending,
    /// Approved together with its period.
    Approved,
    /// Paid out together with its period.
    Paid,
}

/// The payroll result for one employee in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEntry {
    /// The employee paid.
    pub employee_id: String,
    /// The period paid for.
    pub week_id: WeekId,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Statutory deductions.
    pub statutory: StatutoryDeductions,
    /// Ad-hoc deductions.
    pub ad_hoc: AdHocDeductions,
    /// Exact sum of all nine itemized deductions.
    pub total_deductions: Decimal,
    /// `gross_pay - total_deductions`, unclamped.
    pub net_pay: Decimal,
    /// Approval status.
    #[serde(default)]
    pub status: EntryStatus,
}

impl PayrollEntry {
    /// All nine itemized deductions as `(field, amount)` pairs.
    pub fn itemized_deductions(&self) -> Vec<(&'static str, Decimal)> {
        self.statutory
            .items()
            .into_iter()
            .chain(self.ad_hoc.items())
            .collect()
    }

    /// Returns true if the stored totals agree with the itemized fields.
    pub fn is_balanced(&self) -> bool {
        let sum: Decimal = self.itemized_deductions().iter().map(|(_, v)| *v).sum();
        sum == self.total_deductions && self.gross_pay - self.total_deductions == self.net_pay
    }

    /// Net pay floored at zero, for callers that never display a negative payout.
    pub fn net_pay_floored(&self) -> Decimal {
        self.net_pay.max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_entry() -> PayrollEntry {
        let statutory = StatutoryDeductions {
            sss: dec("50.00"),
            philhealth: dec("62.50"),
            pagibig: dec("20.00"),
            withholding_tax: dec("0.00"),
        };
        let ad_hoc = AdHocDeductions {
            cash_advance: dec("100"),
            short: dec("15.25"),
            ..Default::default()
        };
        let total = statutory.total() + ad_hoc.total();
        PayrollEntry {
            employee_id: "emp_001".to_string(),
            week_id: WeekId::new(2025, 2).unwrap(),
            gross_pay: dec("1000.00"),
            statutory,
            ad_hoc,
            total_deductions: total,
            net_pay: dec("1000.00") - total,
            status: EntryStatus::Pending,
        }
    }

    #[test]
    fn test_itemized_deductions_lists_all_nine_fields() {
        let entry = create_entry();
        let fields: Vec<&str> = entry.itemized_deductions().iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![
                "sss",
                "philhealth",
                "pagibig",
                "withholding_tax",
                "cash_advance",
                "loan",
                "vat",
                "other",
                "short"
            ]
        );
    }

    #[test]
    fn test_balanced_entry() {
        let entry = create_entry();
        assert_eq!(entry.total_deductions, dec("247.75"));
        assert_eq!(entry.net_pay, dec("752.25"));
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_tampered_total_is_unbalanced() {
        let mut entry = create_entry();
        entry.total_deductions += dec("0.01");
        assert!(!entry.is_balanced());
    }

    #[test]
    fn test_net_pay_floored_only_clamps_negative_values() {
        let mut entry = create_entry();
        assert_eq!(entry.net_pay_floored(), dec("752.25"));
        entry.net_pay = dec("-20");
        assert_eq!(entry.net_pay_floored(), Decimal::ZERO);
    }

    #[test]
    fn test_ad_hoc_deserializes_missing_fields_as_zero() {
        let ad_hoc: AdHocDeductions = serde_json::from_str(r#"{"loan": "300"}"#).unwrap();
        assert_eq!(ad_hoc.loan, dec("300"));
        assert_eq!(ad_hoc.short, Decimal::ZERO);
        assert_eq!(ad_hoc.total(), dec("300"));
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_string(&create_entry()).unwrap();
        assert!(json.contains("\"week_id\":202502"));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("\"net_pay\":\"752.25\""));
    }
}
