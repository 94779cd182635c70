//! # Analytics Aggregator
//!
//! Spending breakdowns by category. Everything here is computed from bill
//! amounts; bill counts are only reported alongside, never used as weights.

use std::collections::BTreeMap;

use shared::{Bill, BillCategory, CategoryComparisonEntry, HighestCategory};

/// Bills above this amount are reported as frequent services
pub const FREQUENT_SERVICE_THRESHOLD: f64 = 10.0;

/// Sentinel label used when there is nothing to rank
const NO_CATEGORY: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: BillCategory,
    pub total: f64,
    pub bill_count: usize,
}

/// Per-category totals in first-encounter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBreakdown {
    total_spent: f64,
    bill_count: usize,
    groups: Vec<CategoryTotal>,
}

impl CategoryBreakdown {
    pub fn from_bills(bills: &[Bill]) -> Self {
        let mut breakdown = Self::default();

        for bill in bills {
            let category = bill.effective_category();
            breakdown.total_spent += bill.amount;
            breakdown.bill_count += 1;

            match breakdown.groups.iter_mut().find(|g| g.category == category) {
                Some(group) => {
                    group.total += bill.amount;
                    group.bill_count += 1;
                }
                None => breakdown.groups.push(CategoryTotal {
                    category,
                    total: bill.amount,
                    bill_count: 1,
                }),
            }
        }

        breakdown
    }

    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    pub fn bill_count(&self) -> usize {
        self.bill_count
    }

    pub fn groups(&self) -> &[CategoryTotal] {
        &self.groups
    }

    fn group(&self, category: BillCategory) -> Option<&CategoryTotal> {
        self.groups.iter().find(|g| g.category == category)
    }

    fn percentage_of(&self, amount: f64) -> f64 {
        if self.total_spent == 0.0 {
            0.0
        } else {
            amount / self.total_spent * 100.0
        }
    }

    /// Totals for the categories that have bills
    pub fn category_totals(&self) -> BTreeMap<BillCategory, f64> {
        self.groups.iter().map(|g| (g.category, g.total)).collect()
    }

    /// Percentages for the categories that have bills
    pub fn category_percentages(&self) -> BTreeMap<BillCategory, f64> {
        self.groups
            .iter()
            .map(|g| (g.category, self.percentage_of(g.total)))
            .collect()
    }

    /// Percentages for all eight categories, absent ones reported as 0
    pub fn percentages_all_categories(&self) -> BTreeMap<BillCategory, f64> {
        BillCategory::ALL
            .into_iter()
            .map(|category| {
                let total = self.group(category).map_or(0.0, |g| g.total);
                (category, self.percentage_of(total))
            })
            .collect()
    }

    /// Largest group; on a tie the first encountered wins
    pub fn highest_category(&self) -> Option<&CategoryTotal> {
        let mut highest: Option<&CategoryTotal> = None;
        for group in &self.groups {
            match highest {
                Some(current) if group.total <= current.total => {}
                _ => highest = Some(group),
            }
        }
        highest
    }

    pub fn highest_category_summary(&self) -> HighestCategory {
        match self.highest_category() {
            Some(group) => HighestCategory {
                category: group.category.as_str().to_string(),
                amount: group.total,
            },
            None => HighestCategory {
                category: NO_CATEGORY.to_string(),
                amount: 0.0,
            },
        }
    }

    pub fn average_per_bill(&self) -> f64 {
        if self.bill_count == 0 {
            0.0
        } else {
            self.total_spent / self.bill_count as f64
        }
    }

    /// Mean bill amount per category, all eight present
    pub fn category_averages_all(&self) -> BTreeMap<BillCategory, f64> {
        BillCategory::ALL
            .into_iter()
            .map(|category| {
                let average = match self.group(category) {
                    Some(g) if g.bill_count > 0 => g.total / g.bill_count as f64,
                    _ => 0.0,
                };
                (category, average)
            })
            .collect()
    }

    pub fn comparison_entries(&self) -> Vec<CategoryComparisonEntry> {
        BillCategory::ALL
            .into_iter()
            .map(|category| {
                let (total, bill_count) = self
                    .group(category)
                    .map_or((0.0, 0), |g| (g.total, g.bill_count));
                CategoryComparisonEntry {
                    category,
                    total,
                    percentage: self.percentage_of(total),
                    bill_count,
                }
            })
            .collect()
    }
}

/// Names of bills costing more than the frequent-service threshold
pub fn frequent_services(bills: &[Bill]) -> Vec<String> {
    bills
        .iter()
        .filter(|bill| bill.amount > FREQUENT_SERVICE_THRESHOLD)
        .map(|bill| bill.bill_name.clone())
        .collect()
}
