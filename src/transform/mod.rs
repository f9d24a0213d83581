pub(crate) mod dihedral;
