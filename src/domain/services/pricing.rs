use crate::config::TieBreak;
use crate::domain::models::code::RedeemableCode;
use crate::domain::models::discount::{AdjustKind, DiscountRule, FeeMode, FeeRule};
use crate::domain::models::item::{BookableItem, PricingMode};
use crate::error::AppError;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct AppliedDiscount {
    pub rule_id: String,
    pub name: String,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct AppliedFee {
    pub rule_id: String,
    pub label: String,
    pub amount_cents: i64,
    pub inclusive: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct AppliedCode {
    pub code: String,
    pub amount_cents: i64,
}

/// Itemized pricing breakdown. Callers render receipts from this; the total
/// alone is never returned bare.
#[derive(Debug, Serialize, Clone)]
pub struct Quote {
    pub base_cents: i64,
    pub discounts: Vec<AppliedDiscount>,
    pub fees: Vec<AppliedFee>,
    pub code: Option<AppliedCode>,
    pub total_cents: i64,
}

impl Quote {
    pub fn discount_cents(&self) -> i64 {
        self.discounts.iter().map(|d| d.amount_cents).sum()
    }

    pub fn additive_fee_cents(&self) -> i64 {
        self.fees
            .iter()
            .filter(|f| !f.inclusive)
            .map(|f| f.amount_cents)
            .sum()
    }

    pub fn code_cents(&self) -> i64 {
        self.code.as_ref().map(|c| c.amount_cents).unwrap_or(0)
    }
}

pub struct PricingContext<'a> {
    pub discounts: &'a [DiscountRule],
    pub fees: &'a [FeeRule],
    pub tie_break: TieBreak,
}

/// Computes the final charge for one booking context.
///
/// Discount stacking: matches are walked priority-descending. The top rule
/// always applies; each further rule applies only if it and everything
/// already applied are stackable. The running price never goes below zero.
/// Code validation failures surface as `CodeRejected`, never silently.
pub fn price(
    item: &BookableItem,
    date: NaiveDate,
    time: NaiveTime,
    participants: i32,
    code: Option<&RedeemableCode>,
    ctx: &PricingContext,
) -> Result<Quote, AppError> {
    if participants < 1 {
        return Err(AppError::InvalidArgument("participant count must be positive".into()));
    }
    if participants < item.min_participants {
        return Err(AppError::InvalidArgument(format!(
            "at least {} participants required",
            item.min_participants
        )));
    }
    if item.max_participants > 0 && participants > item.max_participants {
        return Err(AppError::InvalidArgument(format!(
            "at most {} participants allowed",
            item.max_participants
        )));
    }

    let base_cents = match item.pricing_mode {
        PricingMode::PerPerson => item.base_price_cents * participants as i64,
        PricingMode::Flat => {
            let extra = (participants - item.included_participants).max(0) as i64;
            item.base_price_cents + extra * item.per_extra_cents
        }
    };

    let mut matched: Vec<&DiscountRule> = ctx
        .discounts
        .iter()
        .filter(|r| r.matches(item, date, time))
        .collect();

    matched.sort_by(|a, b| {
        let by_priority = b.priority.cmp(&a.priority);
        match ctx.tie_break {
            TieBreak::Newest => by_priority.then(b.created_at.cmp(&a.created_at)),
            TieBreak::MostSpecific => by_priority
                .then(b.scope.specificity().cmp(&a.scope.specificity()))
                .then(b.created_at.cmp(&a.created_at)),
        }
    });

    let mut running = base_cents;
    let mut discounts = Vec::new();
    let mut all_stackable = true;

    for rule in matched {
        let applicable = discounts.is_empty() || (all_stackable && rule.stackable);
        if !applicable {
            continue;
        }

        let amount = match rule.kind {
            AdjustKind::Percentage => running * rule.amount / 100,
            AdjustKind::Fixed => rule.amount,
        }
        .clamp(0, running);

        running -= amount;
        all_stackable &= rule.stackable;
        discounts.push(AppliedDiscount {
            rule_id: rule.id.clone(),
            name: rule.name.clone(),
            amount_cents: amount,
        });
    }

    let applied_code = match code {
        Some(code) => {
            code.validate(date).map_err(|reason| AppError::CodeRejected {
                code: code.code().to_string(),
                reason,
            })?;
            let amount = code.applied_amount(running);
            running -= amount;
            Some(AppliedCode {
                code: code.code().to_string(),
                amount_cents: amount,
            })
        }
        None => None,
    };

    let mut fees = Vec::new();
    let mut total = running;
    for fee in ctx.fees.iter().filter(|f| f.active && f.scope.includes(item)) {
        let amount = match fee.kind {
            AdjustKind::Percentage => base_cents * fee.amount / 100,
            AdjustKind::Fixed => fee.amount,
        }
        .max(0);

        let inclusive = fee.mode == FeeMode::Inclusive;
        if !inclusive {
            total += amount;
        }
        fees.push(AppliedFee {
            rule_id: fee.id.clone(),
            label: fee.label.clone(),
            amount_cents: amount,
            inclusive,
        });
    }

    Ok(Quote {
        base_cents,
        discounts,
        fees,
        code: applied_code,
        total_cents: total,
    })
}
