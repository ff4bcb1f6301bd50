//! # Event Normalizer and Temporal Bucketer
//!
//! `normalize` turns a raw contract feed into [`TemporalData`]. It is a
//! pure function of `(contracts, options)`: period indices derive only from
//! `timestamp - start_date`, never from the wall clock.
//!
//! ## Edge-case policy
//!
//! - Zero contracts, or contracts without events: `NoData`.
//! - Events before `start_date` fold into period 0.
//! - Events after an explicit `end_date` fold into the last period.
//! - A zero payoff is recorded in `event_details` but moves neither matrix.
//! - Mixed currencies are rejected: against `base_currency` when set,
//!   otherwise against the first currency seen.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use lqp_core::{
    Amount, ContractId, LiquidityError, PeriodType, Timestamp, VerificationConfig,
};

use crate::event::{Event, RawContract};
use crate::temporal::{ContractMeta, DateRange, EventDetails, TemporalData};

/// Upper bound on the number of periods a single run may span.
pub const MAX_PERIODS: usize = 4096;

/// Bucketing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub period_type: PeriodType,
    pub period_size: u32,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub base_currency: Option<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Month,
            period_size: 1,
            start_date: None,
            end_date: None,
            base_currency: None,
        }
    }
}

impl NormalizeOptions {
    /// The bucketing subset of a verification config.
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            period_type: config.period_type,
            period_size: config.period_size,
            start_date: config.start_date,
            end_date: config.end_date,
            base_currency: config.base_currency.clone(),
        }
    }

    /// Raw (unclamped) period index of `t` relative to `start`.
    fn raw_period(&self, start: &Timestamp, t: &Timestamp) -> i64 {
        self.period_type
            .units_between(start, t)
            .div_euclid(i64::from(self.period_size))
    }
}

/// Normalize and bucket a contract feed.
pub fn normalize(
    contracts: &[RawContract],
    options: &NormalizeOptions,
) -> Result<TemporalData, LiquidityError> {
    if contracts.is_empty() {
        return Err(LiquidityError::NoData {
            reason: "contract list is empty".into(),
        });
    }
    if options.period_size == 0 {
        return Err(LiquidityError::config("period_size must be >= 1"));
    }

    let (metas, mut events) = parse_contracts(contracts, options)?;
    if events.is_empty() {
        return Err(LiquidityError::NoData {
            reason: format!("{} contracts carry no events", contracts.len()),
        });
    }
    events.sort_by(|a, b| {
        (a.timestamp, a.contract_index).cmp(&(b.timestamp, b.contract_index))
    });

    let first = events[0].timestamp;
    let last = events[events.len() - 1].timestamp;
    let start = options.start_date.unwrap_or(first);
    let end = options.end_date.unwrap_or(last);
    if end < start {
        return Err(LiquidityError::config(format!(
            "end_date {end} precedes start_date {start}"
        )));
    }

    let last_index = options.raw_period(&start, &end).max(0);
    let periods_count = usize::try_from(last_index)
        .ok()
        .and_then(|i| i.checked_add(1))
        .filter(|n| *n <= MAX_PERIODS)
        .ok_or_else(|| {
            LiquidityError::config(format!(
                "date range {start}..{end} spans more than {MAX_PERIODS} {} periods",
                options.period_type
            ))
        })?;

    let width = metas.len();
    let mut inflows = vec![vec![Amount::ZERO; width]; periods_count];
    let mut outflows = vec![vec![Amount::ZERO; width]; periods_count];
    let mut event_to_period_index = Vec::with_capacity(events.len());
    let mut event_to_contract_index = Vec::with_capacity(events.len());
    let (mut folded_early, mut folded_late) = (0usize, 0usize);

    for event in &events {
        let raw = options.raw_period(&start, &event.timestamp);
        let period = if raw < 0 {
            folded_early += 1;
            0
        } else if raw > last_index {
            folded_late += 1;
            periods_count - 1
        } else {
            raw as usize
        };
        let c = event.contract_index;
        event_to_period_index.push(period);
        event_to_contract_index.push(c);
        let (matrix, field) = match event.payoff.cmp(&Amount::ZERO) {
            Ordering::Greater => (&mut inflows, "inflows"),
            Ordering::Less => (&mut outflows, "outflows"),
            Ordering::Equal => continue,
        };
        let magnitude = event.payoff.abs();
        matrix[period][c] = matrix[period][c].checked_add(magnitude).ok_or_else(|| {
            LiquidityError::EncodingOverflow {
                field: format!("{field}[{}]", metas[c].id),
                period: Some(period),
                value: magnitude.minor(),
            }
        })?;
    }

    if folded_early > 0 {
        tracing::warn!(
            count = folded_early,
            start = %start,
            "events before start_date folded into period 0"
        );
    }
    if folded_late > 0 {
        tracing::warn!(
            count = folded_late,
            end = %end,
            "events after end_date folded into the last period"
        );
    }

    let net_flows = (0..periods_count)
        .map(|p| {
            let total_in = Amount::checked_sum(&inflows[p])
                .ok_or_else(|| LiquidityError::overflow("inflows", Some(p), i128::MAX))?;
            let total_out = Amount::checked_sum(&outflows[p])
                .ok_or_else(|| LiquidityError::overflow("outflows", Some(p), i128::MAX))?;
            total_in
                .checked_sub(total_out)
                .ok_or_else(|| LiquidityError::overflow("net_flows", Some(p), total_in.minor()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = TemporalData {
        periods_count,
        period_type: options.period_type,
        period_size: options.period_size,
        date_range: DateRange { start, end },
        inflows,
        outflows,
        net_flows,
        event_details: EventDetails {
            events,
            event_to_period_index,
            event_to_contract_index,
            start_date: start,
        },
        contracts: metas,
    };
    data.check_invariants()?;
    tracing::debug!(
        periods = data.periods_count,
        contracts = data.contracts_count(),
        events = data.event_details.events.len(),
        "normalized event feed"
    );
    Ok(data)
}

fn parse_contracts(
    contracts: &[RawContract],
    options: &NormalizeOptions,
) -> Result<(Vec<ContractMeta>, Vec<Event>), LiquidityError> {
    let mut reference_currency = options
        .base_currency
        .as_ref()
        .map(|c| c.trim().to_ascii_uppercase());
    let mut seen = BTreeSet::new();
    let mut metas = Vec::with_capacity(contracts.len());
    let mut events = Vec::new();

    for (contract_index, raw) in contracts.iter().enumerate() {
        let id = ContractId::new(&raw.id)?;
        if !seen.insert(id.clone()) {
            return Err(LiquidityError::invalid_input(id.as_str(), "duplicate contract id"));
        }
        let category = raw
            .category
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        for (pos, ev) in raw.events.iter().enumerate() {
            let timestamp = Timestamp::parse(&ev.time).map_err(|e| {
                LiquidityError::invalid_input(id.as_str(), format!("event {pos}: {e}"))
            })?;
            let payoff = ev.payoff.to_amount().map_err(|e| {
                LiquidityError::invalid_input(id.as_str(), format!("event {pos}: {e}"))
            })?;
            if let Some(cur) = ev.currency.as_ref().map(|c| c.trim().to_ascii_uppercase()) {
                match &reference_currency {
                    Some(expected) if *expected != cur => {
                        return Err(LiquidityError::invalid_input(
                            id.as_str(),
                            format!("event {pos}: currency {cur} differs from {expected}"),
                        ));
                    }
                    Some(_) => {}
                    None => reference_currency = Some(cur),
                }
            }
            events.push(Event {
                event_type: ev.event_type.clone(),
                timestamp,
                payoff,
                contract_id: id.clone(),
                contract_index,
                category_hint: category.clone(),
            });
        }
        metas.push(ContractMeta { id, category });
    }
    Ok((metas, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RawEvent, RawPayoff};

    fn ev(time: &str, payoff: i64) -> RawEvent {
        RawEvent {
            event_type: "IP".into(),
            time: time.into(),
            payoff: RawPayoff::Integer(payoff),
            currency: Some("USD".into()),
        }
    }

    fn contract(id: &str, events: Vec<RawEvent>) -> RawContract {
        RawContract {
            id: id.into(),
            category: None,
            events,
        }
    }

    fn units(n: i64) -> Amount {
        Amount::from_units(n).unwrap()
    }

    #[test]
    fn empty_contract_list_is_no_data() {
        let err = normalize(&[], &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, LiquidityError::NoData { .. }));
    }

    #[test]
    fn contracts_without_events_are_no_data() {
        let err = normalize(&[contract("A", vec![])], &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, LiquidityError::NoData { .. }));
    }

    #[test]
    fn buckets_by_month_from_min_event() {
        let c = contract(
            "A",
            vec![
                ev("2025-01-10T00:00:00Z", 100),
                ev("2025-01-20T00:00:00Z", -30),
                ev("2025-02-10T00:00:00Z", -50),
                ev("2025-03-10T00:00:00Z", 70),
            ],
        );
        let data = normalize(&[c], &NormalizeOptions::default()).unwrap();
        assert_eq!(data.periods_count, 3);
        assert_eq!(data.inflows[0][0], units(100));
        assert_eq!(data.outflows[0][0], units(30));
        assert_eq!(data.net_flows, vec![units(70), units(-50), units(70)]);
        assert_eq!(data.event_details.event_to_period_index, vec![0, 0, 1, 2]);
    }

    #[test]
    fn pre_start_and_post_end_events_fold() {
        let c = contract(
            "A",
            vec![
                ev("2024-11-01T00:00:00Z", 10),
                ev("2025-01-15T00:00:00Z", 20),
                ev("2025-09-01T00:00:00Z", -5),
            ],
        );
        let opts = NormalizeOptions {
            start_date: Timestamp::parse("2025-01-01").ok(),
            end_date: Timestamp::parse("2025-03-31").ok(),
            ..NormalizeOptions::default()
        };
        let data = normalize(&[c], &opts).unwrap();
        assert_eq!(data.periods_count, 3);
        assert_eq!(data.inflows[0][0], units(30));
        assert_eq!(data.outflows[2][0], units(5));
        assert_eq!(data.event_details.event_to_period_index, vec![0, 0, 2]);
    }

    #[test]
    fn zero_payoff_recorded_but_not_aggregated() {
        let c = contract("A", vec![ev("2025-01-01", 0), ev("2025-01-02", 5)]);
        let data = normalize(&[c], &NormalizeOptions::default()).unwrap();
        assert_eq!(data.event_details.events.len(), 2);
        assert_eq!(data.inflows[0][0], units(5));
        assert_eq!(data.outflows[0][0], Amount::ZERO);
    }

    #[test]
    fn currency_mismatch_rejected_with_contract_id() {
        let mut bad = ev("2025-01-02", 5);
        bad.currency = Some("eur".into());
        let a = contract("A", vec![ev("2025-01-01", 5)]);
        let b = contract("B", vec![bad]);
        match normalize(&[a, b], &NormalizeOptions::default()) {
            Err(LiquidityError::InvalidInput { contract_id, reason }) => {
                assert_eq!(contract_id, "B");
                assert!(reason.contains("EUR"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_and_payoff_rejected() {
        let c = contract("A", vec![ev("yesterday", 5)]);
        assert!(matches!(
            normalize(&[c], &NormalizeOptions::default()),
            Err(LiquidityError::InvalidInput { .. })
        ));
        let mut e = ev("2025-01-01", 0);
        e.payoff = RawPayoff::Decimal("1.0000001".into());
        assert!(normalize(&[contract("A", vec![e])], &NormalizeOptions::default()).is_err());
    }

    #[test]
    fn duplicate_contract_ids_rejected() {
        let a = contract("A", vec![ev("2025-01-01", 5)]);
        assert!(normalize(&[a.clone(), a], &NormalizeOptions::default()).is_err());
    }

    #[test]
    fn end_before_start_rejected() {
        let opts = NormalizeOptions {
            start_date: Timestamp::parse("2025-06-01").ok(),
            end_date: Timestamp::parse("2025-01-01").ok(),
            ..NormalizeOptions::default()
        };
        let c = contract("A", vec![ev("2025-03-01", 5)]);
        assert!(matches!(
            normalize(&[c], &opts),
            Err(LiquidityError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn quarterly_and_multi_day_periods() {
        let c = contract(
            "A",
            vec![ev("2025-01-01", 1), ev("2025-04-01", 2), ev("2025-12-31", 3)],
        );
        let q = NormalizeOptions {
            period_type: PeriodType::Quarter,
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize(&[c.clone()], &q).unwrap().periods_count, 4);
        let ten_days = NormalizeOptions {
            period_type: PeriodType::Day,
            period_size: 10,
            ..NormalizeOptions::default()
        };
        // 364 days / 10 = 36, so 37 buckets.
        assert_eq!(normalize(&[c], &ten_days).unwrap().periods_count, 37);
    }

    #[test]
    fn weekly_buckets_count_whole_seven_day_spans() {
        let c = contract(
            "A",
            vec![
                ev("2025-01-01", 1),
                ev("2025-01-07", 2),
                ev("2025-01-08", -3),
                ev("2025-01-29", 4),
            ],
        );
        let weekly = NormalizeOptions {
            period_type: PeriodType::Week,
            ..NormalizeOptions::default()
        };
        let data = normalize(&[c], &weekly).unwrap();
        assert_eq!(data.periods_count, 5);
        assert_eq!(data.event_details.event_to_period_index, vec![0, 0, 1, 4]);
        assert_eq!(data.inflows[0][0], units(3));
        assert_eq!(data.outflows[1][0], units(3));
        assert_eq!(data.net_flows[2], Amount::ZERO);
    }

    #[test]
    fn yearly_buckets_follow_the_start_anniversary() {
        let c = contract(
            "A",
            vec![
                ev("2023-06-15", 10),
                ev("2024-06-14", 20),
                ev("2024-06-15", -5),
                ev("2025-07-01", 7),
            ],
        );
        let yearly = NormalizeOptions {
            period_type: PeriodType::Year,
            ..NormalizeOptions::default()
        };
        let data = normalize(&[c.clone()], &yearly).unwrap();
        assert_eq!(data.periods_count, 3);
        assert_eq!(data.event_details.event_to_period_index, vec![0, 0, 1, 2]);
        assert_eq!(data.net_flows, vec![units(30), units(-5), units(7)]);

        let biennial = NormalizeOptions {
            period_type: PeriodType::Year,
            period_size: 2,
            ..NormalizeOptions::default()
        };
        let data = normalize(&[c], &biennial).unwrap();
        assert_eq!(data.periods_count, 2);
        assert_eq!(data.event_details.event_to_period_index, vec![0, 0, 0, 1]);
    }

    #[test]
    fn replay_is_deterministic() {
        let feed = vec![
            contract("B", vec![ev("2025-02-01", -3), ev("2025-01-01", 9)]),
            contract("A", vec![ev("2025-01-01", 4)]),
        ];
        let a = normalize(&feed, &NormalizeOptions::default()).unwrap();
        let b = normalize(&feed, &NormalizeOptions::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.event_details.event_to_contract_index, vec![0, 1, 0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::event::{RawEvent, RawPayoff};
    use proptest::prelude::*;

    fn feed() -> impl Strategy<Value = Vec<RawContract>> {
        prop::collection::vec(
            prop::collection::vec((0i64..365 * 86_400, -1_000_000i64..1_000_000), 1..20),
            1..5,
        )
        .prop_map(|contracts| {
            contracts
                .into_iter()
                .enumerate()
                .map(|(i, evs)| RawContract {
                    id: format!("C{i}"),
                    category: None,
                    events: evs
                        .into_iter()
                        .map(|(offset, payoff)| RawEvent {
                            event_type: "CF".into(),
                            time: Timestamp::from_epoch_secs(1_735_689_600 + offset)
                                .map(|t| t.to_iso8601())
                                .unwrap_or_default(),
                            payoff: RawPayoff::Integer(payoff),
                            currency: None,
                        })
                        .collect(),
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn net_flow_law_holds(contracts in feed()) {
            let data = normalize(&contracts, &NormalizeOptions::default()).unwrap();
            for p in 0..data.periods_count {
                let total_in = data.period_inflow(p).unwrap();
                let total_out = data.period_outflow(p).unwrap();
                prop_assert_eq!(total_in.checked_sub(total_out), Some(data.net_flows[p]));
            }
        }

        #[test]
        fn no_value_is_dropped(contracts in feed()) {
            let data = normalize(&contracts, &NormalizeOptions::default()).unwrap();
            let raw_total: i128 = contracts
                .iter()
                .flat_map(|c| &c.events)
                .map(|e| e.payoff.to_amount().unwrap().minor())
                .sum();
            let net_total: i128 = data.net_flows.iter().map(|a| a.minor()).sum();
            prop_assert_eq!(raw_total, net_total);
        }
    }
}
