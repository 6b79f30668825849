//! Initial magnetisation directives.

/// Filename of the initial orientation field loaded by the script.
pub const M0_FILENAME: &str = "m0.omf";

pub fn magnetisation_script() -> String {
    let mut mx3 = String::from("// Magnetisation\n");
    mx3 += &format!("m.LoadFile(\"{}\")\n", M0_FILENAME);
    mx3
}
