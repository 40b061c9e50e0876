//! Water autoionization constants and helpers.

use aq_core::Real;

/// Default ion product of water, Kw near 25 C.
pub const KW_DEFAULT: Real = 1.01e-14;

/// Hydronium concentration at the given pH.
pub fn hydronium(ph: Real) -> Real {
    10.0_f64.powf(-ph)
}

/// Hydroxide concentration at the given pH for the given ion product.
pub fn hydroxide(ph: Real, kw: Real) -> Real {
    kw / hydronium(ph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::{Tolerances, nearly_equal};

    #[test]
    fn hydronium_at_neutral() {
        let tol = Tolerances::default();
        assert!(nearly_equal(hydronium(7.0), 1e-7, tol));
        assert!(nearly_equal(hydronium(0.0), 1.0, tol));
    }

    #[test]
    fn ion_product_holds() {
        let tol = Tolerances::default();
        for ph in [1.0, 4.2, 7.0, 10.5, 13.0] {
            let product = hydronium(ph) * hydroxide(ph, KW_DEFAULT);
            assert!(nearly_equal(product, KW_DEFAULT, tol));
        }
    }
}
