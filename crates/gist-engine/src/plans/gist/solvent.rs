use gist_core::constants::SMALL;
use gist_core::error::{GistError, GistResult};
use gist_core::system::{MolRange, Topology};

/// Solvent stoichiometry recorded from the first solvent molecule and used to
/// validate every later one. Element buckets keep stable first-seen order.
#[derive(Clone, Debug)]
pub struct SolventModel {
    n_mol_atoms: usize,
    charges: Vec<f64>,
    unique_elements: Vec<String>,
    i_element: Vec<usize>,
    element_count: Vec<usize>,
}

impl SolventModel {
    pub fn from_first(topology: &Topology, mol: MolRange) -> Self {
        let mut charges = Vec::with_capacity(mol.n_atoms);
        let mut unique_elements: Vec<String> = Vec::new();
        let mut i_element = Vec::with_capacity(mol.n_atoms);
        let mut element_count: Vec<usize> = Vec::new();
        let mut q_sum = 0.0;
        for atom in mol.atoms() {
            let q = topology.charge(atom);
            charges.push(q);
            q_sum += q;
            let elem = topology.element(atom);
            match unique_elements.iter().position(|e| e == elem) {
                Some(idx) => {
                    i_element.push(idx);
                    element_count[idx] += 1;
                }
                None => {
                    unique_elements.push(elem.to_string());
                    i_element.push(unique_elements.len() - 1);
                    element_count.push(1);
                }
            }
        }
        if q_sum.abs() > SMALL {
            log::warn!("charges on solvent do not sum to 0 ({q_sum:.6})");
        }
        Self {
            n_mol_atoms: mol.n_atoms,
            charges,
            unique_elements,
            i_element,
            element_count,
        }
    }

    pub fn check(&self, topology: &Topology, mol: MolRange) -> GistResult<()> {
        if mol.n_atoms != self.n_mol_atoms {
            return Err(GistError::Topology(format!(
                "all solvent molecules must have the same number of atoms; \
                 found {} atoms, expected {}",
                mol.n_atoms, self.n_mol_atoms
            )));
        }
        for (offset, atom) in mol.atoms().enumerate() {
            let q = topology.charge(atom);
            if (q - self.charges[offset]).abs() > SMALL {
                log::warn!(
                    "charge on solvent atom {atom} ({q}) does not match the first molecule ({})",
                    self.charges[offset]
                );
            }
        }
        Ok(())
    }

    pub fn n_mol_atoms(&self) -> usize {
        self.n_mol_atoms
    }

    pub fn charge(&self, offset: usize) -> f64 {
        self.charges[offset]
    }

    pub fn unique_elements(&self) -> &[String] {
        &self.unique_elements
    }

    pub fn n_elements(&self) -> usize {
        self.unique_elements.len()
    }

    /// Element bucket of the given within-molecule atom offset.
    pub fn element_bucket(&self, offset: usize) -> usize {
        self.i_element[offset]
    }

    /// Number of atoms of the given element per solvent molecule.
    pub fn element_count(&self, bucket: usize) -> usize {
        self.element_count[bucket]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gist_core::system::{AtomSpec, TopologyBuilder};

    fn water_atoms() -> Vec<AtomSpec> {
        vec![
            AtomSpec::new("O", -0.834, 15.999, 0),
            AtomSpec::new("H", 0.417, 1.008, 0),
            AtomSpec::new("H", 0.417, 1.008, 0),
        ]
    }

    #[test]
    fn element_buckets_follow_first_seen_order() {
        let top = TopologyBuilder::new()
            .add_molecule(true, water_atoms())
            .finish()
            .unwrap();
        let model = SolventModel::from_first(&top, top.mol(0));
        assert_eq!(model.unique_elements(), &["O".to_string(), "H".to_string()]);
        assert_eq!(model.element_bucket(0), 0);
        assert_eq!(model.element_bucket(2), 1);
        assert_eq!(model.element_count(1), 2);
    }

    #[test]
    fn check_rejects_different_atom_count() {
        let top = TopologyBuilder::new()
            .add_molecule(true, water_atoms())
            .add_molecule(
                true,
                vec![
                    AtomSpec::new("O", -0.834, 15.999, 0),
                    AtomSpec::new("H", 0.417, 1.008, 0),
                ],
            )
            .finish()
            .unwrap();
        let model = SolventModel::from_first(&top, top.mol(0));
        assert!(model.check(&top, top.mol(1)).is_err());
    }

    #[test]
    fn check_accepts_matching_molecule() {
        let top = TopologyBuilder::new()
            .add_molecule(true, water_atoms())
            .add_molecule(true, water_atoms())
            .finish()
            .unwrap();
        let model = SolventModel::from_first(&top, top.mol(0));
        assert!(model.check(&top, top.mol(1)).is_ok());
    }
}
