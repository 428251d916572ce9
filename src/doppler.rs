/// Speed of light in km/s.
pub const C_KMS: f64 = 299_792.458;
/// Rest frequency of the neutral hydrogen hyperfine line in MHz.
pub const HI_REST_FREQUENCY_MHZ: f64 = 1420.405751;

/// Tuning frequency (Hz) that places HI receding at `velocity_kms` at the
/// band center.
pub fn frequency_for_velocity_hz(velocity_kms: f64) -> f64 {
    HI_REST_FREQUENCY_MHZ * (1.0 - velocity_kms / C_KMS) * 1.0e6
}

/// Radial velocity offset (km/s) of a frequency offset `delta_f` from `f0`.
/// Both frequencies must share a unit.
pub fn velocity_offset_kms(delta_f: f64, f0: f64) -> f64 {
    C_KMS * delta_f / f0
}
