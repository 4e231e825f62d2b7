use polars::prelude::*;

/// One raw panel row; defaults give a mid-price of 2.0 and an in-band delta.
#[derive(Debug, Clone, Copy)]
pub struct RawRow {
    pub optionid: i64,
    pub date: i32,
    pub spot: f64,
    pub strike_price: f64,
    pub best_bid: f64,
    pub best_offer: f64,
    pub vix: f64,
    pub impl_volatility: f64,
    pub impvol_chg: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub time_to_maturity: f64,
}

impl RawRow {
    pub fn new(optionid: i64, date: i32) -> Self {
        let t = f64::from(date);
        Self {
            optionid,
            date,
            spot: 100.0 + t,
            strike_price: 95.0,
            best_bid: 1.9,
            best_offer: 2.1,
            vix: 18.0 + 0.1 * t,
            impl_volatility: 0.2 + 0.01 * t + 0.001 * optionid as f64,
            impvol_chg: 0.01,
            delta: 0.5,
            gamma: 0.02,
            vega: 0.15,
            theta: -0.03,
            time_to_maturity: 30.0 - t,
        }
    }

    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn quotes(mut self, best_bid: f64, best_offer: f64) -> Self {
        self.best_bid = best_bid;
        self.best_offer = best_offer;
        self
    }
}

pub fn raw_frame(rows: &[RawRow]) -> DataFrame {
    let f = |get: fn(&RawRow) -> f64| rows.iter().map(get).collect::<Vec<f64>>();
    df! {
        "optionid" => rows.iter().map(|r| r.optionid).collect::<Vec<_>>(),
        "date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        "spot" => f(|r| r.spot),
        "strike_price" => f(|r| r.strike_price),
        "best_bid" => f(|r| r.best_bid),
        "best_offer" => f(|r| r.best_offer),
        "VIX" => f(|r| r.vix),
        "impl_volatility" => f(|r| r.impl_volatility),
        "impvol_chg" => f(|r| r.impvol_chg),
        "delta" => f(|r| r.delta),
        "gamma" => f(|r| r.gamma),
        "vega" => f(|r| r.vega),
        "theta" => f(|r| r.theta),
        "time_to_maturity" => f(|r| r.time_to_maturity),
    }
    .expect("raw test frame")
}

/// `days` consecutive rows for each entity id.
pub fn panel(entities: &[i64], days: i32) -> Vec<RawRow> {
    entities
        .iter()
        .flat_map(|&id| (1..=days).map(move |date| RawRow::new(id, date)))
        .collect()
}

pub fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

pub fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
