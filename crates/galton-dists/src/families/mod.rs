//! Concrete distribution families.

mod bernoulli;
mod beta;
mod binomial;
mod gamma;
mod normal;

pub use bernoulli::Bernoulli;
pub use beta::Beta;
pub use binomial::Binomial;
pub use gamma::Gamma;
pub use normal::Normal;
