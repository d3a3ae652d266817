use crate::error::{GistError, GistResult};

/// Lennard-Jones A/B pair coefficients: E = A/r^12 - B/r^6.
#[derive(Clone, Copy, Debug, Default)]
pub struct LjParam {
    pub a: f64,
    pub b: f64,
}

/// Type-pair indexed A/B table, `n_types * n_types` indices into `params`.
#[derive(Clone, Debug)]
pub struct LjTable {
    n_types: usize,
    index: Vec<usize>,
    params: Vec<LjParam>,
}

impl LjTable {
    pub fn new(n_types: usize, index: Vec<usize>, params: Vec<LjParam>) -> GistResult<Self> {
        if index.len() != n_types * n_types {
            return Err(GistError::Mismatch(
                "LJ index table must be n_types * n_types".into(),
            ));
        }
        if let Some(&bad) = index.iter().find(|&&i| i >= params.len()) {
            return Err(GistError::Mismatch(format!(
                "LJ index {bad} exceeds parameter array length {}",
                params.len()
            )));
        }
        Ok(Self {
            n_types,
            index,
            params,
        })
    }

    /// Single-type table with no dispersion or repulsion.
    pub fn zero() -> Self {
        Self {
            n_types: 1,
            index: vec![0],
            params: vec![LjParam::default()],
        }
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    pub fn param(&self, t1: usize, t2: usize) -> LjParam {
        self.params[self.index[t1 * self.n_types + t2]]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MolRange {
    pub first: usize,
    pub n_atoms: usize,
    pub is_solvent: bool,
}

impl MolRange {
    pub fn atoms(&self) -> std::ops::Range<usize> {
        self.first..self.first + self.n_atoms
    }
}

#[derive(Clone, Debug)]
pub struct AtomSpec {
    pub element: String,
    pub charge: f64,
    pub mass: f64,
    pub type_index: usize,
}

impl AtomSpec {
    pub fn new(element: &str, charge: f64, mass: f64, type_index: usize) -> Self {
        Self {
            element: element.to_string(),
            charge,
            mass,
            type_index,
        }
    }
}

/// Flat per-atom tables plus the molecule partition. Charges are stored in
/// electron units; masses in amu; LJ parameters through the type table.
#[derive(Clone, Debug)]
pub struct Topology {
    charges: Vec<f64>,
    masses: Vec<f64>,
    elements: Vec<String>,
    type_index: Vec<usize>,
    lj: LjTable,
    mols: Vec<MolRange>,
    atom_mol: Vec<usize>,
}

impl Topology {
    pub fn n_atoms(&self) -> usize {
        self.charges.len()
    }

    pub fn n_mols(&self) -> usize {
        self.mols.len()
    }

    pub fn mols(&self) -> &[MolRange] {
        &self.mols
    }

    pub fn mol(&self, idx: usize) -> MolRange {
        self.mols[idx]
    }

    pub fn mol_of(&self, atom: usize) -> usize {
        self.atom_mol[atom]
    }

    pub fn charge(&self, atom: usize) -> f64 {
        self.charges[atom]
    }

    pub fn mass(&self, atom: usize) -> f64 {
        self.masses[atom]
    }

    pub fn element(&self, atom: usize) -> &str {
        &self.elements[atom]
    }

    pub fn lj_param(&self, a1: usize, a2: usize) -> LjParam {
        self.lj.param(self.type_index[a1], self.type_index[a2])
    }
}

#[derive(Debug, Default)]
pub struct TopologyBuilder {
    atoms: Vec<AtomSpec>,
    mols: Vec<MolRange>,
    lj: Option<LjTable>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lj(mut self, lj: LjTable) -> Self {
        self.lj = Some(lj);
        self
    }

    pub fn add_molecule(mut self, is_solvent: bool, atoms: Vec<AtomSpec>) -> Self {
        self.mols.push(MolRange {
            first: self.atoms.len(),
            n_atoms: atoms.len(),
            is_solvent,
        });
        self.atoms.extend(atoms);
        self
    }

    pub fn finish(self) -> GistResult<Topology> {
        let lj = self.lj.unwrap_or_else(LjTable::zero);
        let mut atom_mol = vec![0usize; self.atoms.len()];
        for (mol_idx, mol) in self.mols.iter().enumerate() {
            for atom in mol.atoms() {
                atom_mol[atom] = mol_idx;
            }
        }
        let mut charges = Vec::with_capacity(self.atoms.len());
        let mut masses = Vec::with_capacity(self.atoms.len());
        let mut elements = Vec::with_capacity(self.atoms.len());
        let mut type_index = Vec::with_capacity(self.atoms.len());
        for atom in self.atoms {
            if atom.type_index >= lj.n_types() {
                return Err(GistError::Topology(format!(
                    "atom type index {} exceeds LJ table with {} types",
                    atom.type_index,
                    lj.n_types()
                )));
            }
            charges.push(atom.charge);
            masses.push(atom.mass);
            elements.push(atom.element);
            type_index.push(atom.type_index);
        }
        Ok(Topology {
            charges,
            masses,
            elements,
            type_index,
            lj,
            mols: self.mols,
            atom_mol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_partitions_molecules() {
        let top = TopologyBuilder::new()
            .add_molecule(
                false,
                vec![
                    AtomSpec::new("C", 0.1, 12.011, 0),
                    AtomSpec::new("O", -0.1, 15.999, 0),
                ],
            )
            .add_molecule(
                true,
                vec![
                    AtomSpec::new("O", -0.834, 15.999, 0),
                    AtomSpec::new("H", 0.417, 1.008, 0),
                    AtomSpec::new("H", 0.417, 1.008, 0),
                ],
            )
            .finish()
            .unwrap();
        assert_eq!(top.n_atoms(), 5);
        assert_eq!(top.n_mols(), 2);
        assert_eq!(top.mol_of(0), 0);
        assert_eq!(top.mol_of(4), 1);
        assert!(top.mol(1).is_solvent);
        assert_eq!(top.element(2), "O");
    }

    #[test]
    fn lj_table_rejects_bad_index() {
        assert!(LjTable::new(1, vec![3], vec![LjParam::default()]).is_err());
    }

    #[test]
    fn lj_lookup_uses_type_pair() {
        let lj = LjTable::new(
            2,
            vec![0, 1, 1, 2],
            vec![
                LjParam { a: 1.0, b: 2.0 },
                LjParam { a: 3.0, b: 4.0 },
                LjParam { a: 5.0, b: 6.0 },
            ],
        )
        .unwrap();
        let top = TopologyBuilder::new()
            .with_lj(lj)
            .add_molecule(
                true,
                vec![
                    AtomSpec::new("O", -0.8, 16.0, 0),
                    AtomSpec::new("H", 0.4, 1.0, 1),
                ],
            )
            .finish()
            .unwrap();
        assert!((top.lj_param(0, 1).a - 3.0).abs() < 1e-12);
        assert!((top.lj_param(1, 1).b - 6.0).abs() < 1e-12);
    }
}
