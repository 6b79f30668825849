//! Mesh directives: grid size, cell size, periodic boundaries.

use crate::mesh::Mesh;

use super::fmt_num;

pub fn mesh_script(mesh: &Mesh) -> String {
    let mut mx3 = String::from("// Mesh\n");
    if !mesh.bc.is_empty() {
        let mut repetitions = [0usize; 3];
        for direction in mesh.bc.chars() {
            match direction {
                'x' => repetitions[0] = 1,
                'y' => repetitions[1] = 1,
                'z' => repetitions[2] = 1,
                _ => {}
            }
        }
        mx3 += &format!(
            "SetPBC({}, {}, {})\n",
            repetitions[0], repetitions[1], repetitions[2]
        );
    }
    mx3 += &format!("SetGridSize({}, {}, {})\n", mesh.n[0], mesh.n[1], mesh.n[2]);
    mx3 += &format!(
        "SetCellSize({}, {}, {})\n\n",
        fmt_num(mesh.cell[0]),
        fmt_num(mesh.cell[1]),
        fmt_num(mesh.cell[2])
    );
    mx3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_script() {
        let mesh = Mesh::new([0.0; 3], [10e-9, 10e-9, 2e-9], [10, 10, 2]).unwrap();
        let mx3 = mesh_script(&mesh);
        assert!(mx3.contains("SetGridSize(10, 10, 2)"));
        assert!(mx3.contains("SetCellSize(1e-9, 1e-9, 1e-9)"));
        assert!(!mx3.contains("SetPBC"));
    }

    #[test]
    fn test_mesh_script_pbc() {
        let mesh = Mesh::new([0.0; 3], [4e-9, 4e-9, 4e-9], [4, 4, 4])
            .unwrap()
            .with_bc("xz")
            .unwrap();
        let mx3 = mesh_script(&mesh);
        assert!(mx3.contains("SetPBC(1, 0, 1)"));
    }
}
