//! Physical constants in the Amber unit system (Å, kcal/mol, electron charges).

/// Converts electron charges to Amber charge units.
pub const ELECTOAMBER: f64 = 18.2223;

/// Coulomb prefactor for charges stored in electron units.
pub const QFAC: f64 = ELECTOAMBER * ELECTOAMBER;

/// Gas constant in kcal/mol/K.
pub const GASK_KCAL: f64 = 0.001_987_204_1;

/// Euler-Mascheroni constant.
pub const EULER_MASC: f64 = 0.577_215_664_901_532_9;

/// Debye per electron-Angstrom.
pub const DEBYE_EA: f64 = 0.208_226_78;

/// Tolerance for floating-point equality of charges and axis degeneracy.
pub const SMALL: f64 = 1.0e-8;

/// Floor applied to nearest-neighbor distances before taking logarithms.
pub const GIST_TINY: f64 = 1.0e-10;

/// Sentinel squared distance meaning "no neighbor found".
pub const GIST_HUGE: f64 = 1.0e10;
