//! Special functions for hydrogen wave functions
//!
//! Factorials plus the associated Legendre and Laguerre polynomials,
//! evaluated with their stable recurrences. Everything is f64: the radial
//! normalization takes ratios of factorials up to (n+l)! and 14! already
//! exceeds what an f32 mantissa can hold exactly.

/// Factorial k!, exact for every k this crate can request (k <= 20).
pub fn factorial(k: u32) -> f64 {
    if k <= 1 {
        return 1.0;
    }
    let mut result = 1.0;
    for i in 2..=k {
        result *= i as f64;
    }
    result
}

/// Double factorial k!! = k(k-2)(k-4)... down to 1 or 2; 1 for k <= 0.
pub fn double_factorial(k: i32) -> f64 {
    let mut result = 1.0;
    let mut i = k;
    while i > 0 {
        result *= i as f64;
        i -= 2;
    }
    result
}

/// Associated Legendre polynomial P_l^m(x) for x in [-1, 1].
///
/// Evaluated with the standard three-term recurrence rather than a
/// closed-form sum, which is unstable for higher l. The Condon-Shortley
/// phase (-1)^|m| is folded into the P_m^m seed; the spherical harmonic
/// must not apply it a second time. Returns 0 when |m| > l.
pub fn legendre(l: u32, m: i32, x: f64) -> f64 {
    let abs_m = m.unsigned_abs();
    if abs_m > l {
        return 0.0;
    }

    // Seed P_m^m(x) = (-1)^m (2m-1)!! (1 - x^2)^(m/2)
    let sign = if abs_m % 2 == 0 { 1.0 } else { -1.0 };
    let mut p_mm =
        sign * double_factorial(2 * abs_m as i32 - 1) * (1.0 - x * x).powf(abs_m as f64 / 2.0);
    if l == abs_m {
        return p_mm;
    }

    // Seed P_{m+1}^m(x) = x (2m+1) P_m^m(x)
    let mut p_m1 = x * (2 * abs_m + 1) as f64 * p_mm;
    if l == abs_m + 1 {
        return p_m1;
    }

    for ll in (abs_m + 2)..=l {
        let p_ll = (x * (2 * ll - 1) as f64 * p_m1 - (ll + abs_m - 1) as f64 * p_mm)
            / (ll - abs_m) as f64;
        p_mm = p_m1;
        p_m1 = p_ll;
    }
    p_m1
}

/// Generalized Laguerre polynomial L_n^k(x) by the forward recurrence
/// L_0 = 1, L_1 = 1 + k - x, (i+1) L_{i+1} = (2i+1+k-x) L_i - (i+k) L_{i-1}.
pub fn laguerre(n: u32, k: u32, x: f64) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let mut l0 = 1.0;
    let mut l1 = 1.0 + k as f64 - x;
    for i in 1..n {
        let next = (((2 * i + 1 + k) as f64 - x) * l1 - (i + k) as f64 * l0) / (i + 1) as f64;
        l0 = l1;
        l1 = next;
    }
    l1
}
