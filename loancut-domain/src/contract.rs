//! Loan contracts: time-value functions of principal under periodic or
//! continuous compounding.
//!
//! All evaluations take a *duration* measured from the contract origin,
//! never an absolute time; callers subtract the timestamp themselves and
//! guarantee the result is non-negative.

use thiserror::Error;

use crate::epsilon::Epsilon;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContractError {
    #[error("principal must be a non-negative finite number (got {0})")]
    InvalidPrincipal(f64),
    #[error("interest rate must be a non-negative finite number (got {0})")]
    InvalidInterestRate(f64),
    #[error("compounding periods must be strictly positive (got {0})")]
    InvalidCompounding(f64),
    #[error("timestamp must be finite (got {0})")]
    InvalidTimestamp(f64),
    #[error("duration must be a non-negative finite number (got {0})")]
    InvalidDuration(f64),
    #[error("debt cut {cut} is outside [0, {value}] for contract '{name}'")]
    CutOutOfRange { name: String, cut: f64, value: f64 },
}

/// Compounding scheme of a contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Compounding {
    /// Interest applied `periods` times per time unit.
    Periodic { periods: f64 },
    /// The `periods -> infinity` limit.
    Continuous,
}

/// A named loan contract.
#[derive(Debug, Clone)]
pub struct Contract {
    name: String,
    principal: f64,
    interest_rate: f64,
    compounding: Compounding,
    timestamp: f64,
}

fn check_principal(principal: f64) -> Result<(), ContractError> {
    if !principal.is_finite() || principal < 0.0 {
        return Err(ContractError::InvalidPrincipal(principal));
    }
    Ok(())
}

fn check_interest_rate(rate: f64) -> Result<(), ContractError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ContractError::InvalidInterestRate(rate));
    }
    Ok(())
}

fn check_periods(periods: f64) -> Result<(), ContractError> {
    if periods.is_nan() || periods <= 0.0 {
        return Err(ContractError::InvalidCompounding(periods));
    }
    Ok(())
}

fn check_timestamp(timestamp: f64) -> Result<(), ContractError> {
    if !timestamp.is_finite() {
        return Err(ContractError::InvalidTimestamp(timestamp));
    }
    Ok(())
}

fn check_duration(duration: f64) -> Result<(), ContractError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(ContractError::InvalidDuration(duration));
    }
    Ok(())
}

impl Contract {
    /// A contract compounding `periods` times per time unit.
    ///
    /// `periods = +inf` degrades to the continuous scheme.
    pub fn periodic(
        name: impl Into<String>,
        principal: f64,
        interest_rate: f64,
        periods: f64,
        timestamp: f64,
    ) -> Result<Self, ContractError> {
        check_principal(principal)?;
        check_interest_rate(interest_rate)?;
        check_periods(periods)?;
        check_timestamp(timestamp)?;
        let compounding = if periods.is_infinite() {
            Compounding::Continuous
        } else {
            Compounding::Periodic { periods }
        };
        Ok(Self {
            name: name.into(),
            principal,
            interest_rate,
            compounding,
            timestamp,
        })
    }

    /// A continuously compounding contract.
    pub fn continuous(
        name: impl Into<String>,
        principal: f64,
        interest_rate: f64,
        timestamp: f64,
    ) -> Result<Self, ContractError> {
        check_principal(principal)?;
        check_interest_rate(interest_rate)?;
        check_timestamp(timestamp)?;
        Ok(Self {
            name: name.into(),
            principal,
            interest_rate,
            compounding: Compounding::Continuous,
            timestamp,
        })
    }

    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// Periods per time unit; `+inf` for continuous contracts.
    pub fn compounding_periods(&self) -> f64 {
        match self.compounding {
            Compounding::Periodic { periods } => periods,
            Compounding::Continuous => f64::INFINITY,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.compounding, Compounding::Continuous)
    }

    pub fn set_principal(&mut self, principal: f64) -> Result<(), ContractError> {
        check_principal(principal)?;
        self.principal = principal;
        Ok(())
    }

    pub fn set_interest_rate(&mut self, rate: f64) -> Result<(), ContractError> {
        check_interest_rate(rate)?;
        self.interest_rate = rate;
        Ok(())
    }

    pub fn set_timestamp(&mut self, timestamp: f64) -> Result<(), ContractError> {
        check_timestamp(timestamp)?;
        self.timestamp = timestamp;
        Ok(())
    }

    /// Multiplicative growth over `duration` time units from the origin.
    pub fn growth_factor(&self, duration: f64) -> Result<f64, ContractError> {
        check_duration(duration)?;
        Ok(match self.compounding {
            Compounding::Periodic { periods } => {
                let rate_per_period = self.interest_rate / periods;
                (1.0 + rate_per_period).powf((periods * duration).floor())
            }
            Compounding::Continuous => (self.interest_rate * duration).exp(),
        })
    }

    /// Accrued value `duration` time units after the origin.
    pub fn value_at(&self, duration: f64) -> Result<f64, ContractError> {
        Ok(self.principal * self.growth_factor(duration)?)
    }

    /// How far the origin must move *toward* the moment `duration` units
    /// away so that a compounding tick lands exactly on that moment while
    /// the accrued value there is unchanged. Zero for continuous
    /// contracts; `(n*d - floor(n*d)) / n` for periodic ones.
    pub fn tick_shift(&self, duration: f64) -> Result<f64, ContractError> {
        check_duration(duration)?;
        Ok(match self.compounding {
            Compounding::Periodic { periods } => (periods * duration).fract() / periods,
            Compounding::Continuous => 0.0,
        })
    }

    /// A contract of the same variant re-anchored at absolute time `time`
    /// with `cut` forgiven from the value accrued by then.
    ///
    /// The cut must lie in `[0, value]` within `eps`; the resulting
    /// principal is clamped at zero for cuts that exhaust the contract up
    /// to rounding.
    pub fn apply_debt_cut(&self, cut: f64, time: f64, eps: Epsilon) -> Result<Self, ContractError> {
        let value = self.value_at(time - self.timestamp)?;
        if !cut.is_finite() || cut < 0.0 || (cut > value && !eps.eq(cut, value)) {
            return Err(ContractError::CutOutOfRange {
                name: self.name.clone(),
                cut,
                value,
            });
        }
        Ok(Self {
            name: self.name.clone(),
            principal: (value - cut).max(0.0),
            interest_rate: self.interest_rate,
            compounding: self.compounding,
            timestamp: time,
        })
    }

    /// Attribute-wise comparison of principal, rate, compounding periods
    /// and timestamp within `eps`. Names are deliberately not compared;
    /// they are the identity, not the content.
    pub fn approx_eq(&self, other: &Self, eps: Epsilon) -> bool {
        let periods_match = match (self.compounding, other.compounding) {
            (Compounding::Continuous, Compounding::Continuous) => true,
            (Compounding::Periodic { periods: a }, Compounding::Periodic { periods: b }) => {
                eps.eq(a, b)
            }
            _ => false,
        };
        periods_match
            && eps.eq(self.principal, other.principal)
            && eps.eq(self.interest_rate, other.interest_rate)
            && eps.eq(self.timestamp, other.timestamp)
    }
}

/// Fluent construction of contracts.
///
/// ```
/// use loancut_domain::Contract;
///
/// let contract = Contract::builder("loan-1")
///     .principal(10.0)
///     .interest_rate(0.15)
///     .compounding_periods(12.0)
///     .timestamp(3.0)
///     .build()
///     .unwrap();
/// assert!(!contract.is_continuous());
/// ```
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    name: String,
    principal: f64,
    interest_rate: f64,
    compounding: Compounding,
    timestamp: f64,
}

impl ContractBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal: 0.0,
            interest_rate: 0.0,
            compounding: Compounding::Continuous,
            timestamp: 0.0,
        }
    }

    pub fn principal(mut self, principal: f64) -> Self {
        self.principal = principal;
        self
    }

    pub fn interest_rate(mut self, rate: f64) -> Self {
        self.interest_rate = rate;
        self
    }

    pub fn compounding_periods(mut self, periods: f64) -> Self {
        self.compounding = Compounding::Periodic { periods };
        self
    }

    pub fn continuous(mut self) -> Self {
        self.compounding = Compounding::Continuous;
        self
    }

    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> Result<Contract, ContractError> {
        match self.compounding {
            Compounding::Periodic { periods } => Contract::periodic(
                self.name,
                self.principal,
                self.interest_rate,
                periods,
                self.timestamp,
            ),
            Compounding::Continuous => Contract::continuous(
                self.name,
                self.principal,
                self.interest_rate,
                self.timestamp,
            ),
        }
    }
}
