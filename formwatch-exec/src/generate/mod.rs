//! Values typed into forms that are produced rather than written in the journey document.

mod coupon;

use formwatch_core::GeneratorKind;

pub use coupon::{CouponGenerator, COUPON_LEN};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("could not satisfy {generator} constraints after {attempts} attempts")]
    Exhausted {
        generator: &'static str,
        attempts: usize,
    },
}

pub trait ValueGenerator: Send + Sync {
    fn generate(&self, kind: GeneratorKind) -> Result<String, GenerateError>;
}

/// Where coupon codes come from for `{ generate: coupon }` inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CouponPolicy {
    #[default]
    Generate,
    /// Every attempt uses this code. Pair it with an expectation on the rejection banner to
    /// assert that a known-bad code is still refused.
    Forced(String),
}

impl CouponPolicy {
    /// Blank codes mean "generate".
    pub fn from_option(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if !c.is_empty() => CouponPolicy::Forced(c.to_string()),
            _ => CouponPolicy::Generate,
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, CouponPolicy::Forced(_))
    }
}

/// Default generator: coupon codes from [`CouponGenerator`] unless the policy forces one.
pub struct PolicyGenerator {
    coupons: CouponGenerator,
    policy: CouponPolicy,
}

impl PolicyGenerator {
    pub fn new(coupons: CouponGenerator, policy: CouponPolicy) -> Self {
        Self { coupons, policy }
    }

    pub fn policy(&self) -> &CouponPolicy {
        &self.policy
    }
}

impl ValueGenerator for PolicyGenerator {
    fn generate(&self, kind: GeneratorKind) -> Result<String, GenerateError> {
        match kind {
            GeneratorKind::Coupon => match &self.policy {
                CouponPolicy::Forced(code) => Ok(code.clone()),
                CouponPolicy::Generate => self.coupons.generate_code(),
            },
        }
    }
}
