pub mod consts;
pub mod drivers;
pub mod dynamics;
pub mod energy;
pub mod error;
pub mod field;
pub mod mesh;
pub mod ovf;
pub mod runner;
pub mod scripts;
pub mod system;
pub mod table;

// Prelude
pub use drivers::{DriveOpts, DriveResult, Driver, MinDriver, RelaxDriver, TimeDriver};
pub use dynamics::DynamicsTerm;
pub use energy::{CrystalClass, EnergyTerm, ParamValue, Parameter};
pub use error::{Mumax3Error, Result};
pub use field::Field;
pub use mesh::{Mesh, Region};
pub use runner::{autoselect_runner, EngineOutput, ExeMumax3Runner, Mumax3Runner};
pub use system::{delete, System};
pub use table::Table;
