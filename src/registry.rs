//! The ordered descriptor registry.
//!
//! Each descriptor is a stable name plus a plain function pointer. Registry
//! order is column order in every feature row; adding a descriptor touches
//! nothing downstream.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::properties::round_to;
use crate::table::{Column, FeatureValue, Schema};
use crate::toolkit::{ChemistryToolkit, ToolkitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Scalar,
    FunctionalGroup,
    ReactionClass,
}

impl Family {
    /// Group families are usable as include/exclude criteria.
    pub fn is_group(self) -> bool {
        !matches!(self, Family::Scalar)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("descriptor {0:?} is registered twice")]
    DuplicateName(String),
}

pub type DetectorFn<T> = fn(
    &T,
    &<T as ChemistryToolkit>::Molecule,
    &PipelineConfig,
) -> Result<FeatureValue, ToolkitError>;

pub struct Descriptor<T: ChemistryToolkit> {
    pub name: &'static str,
    pub label: &'static str,
    pub family: Family,
    pub compute: DetectorFn<T>,
}

impl<T: ChemistryToolkit> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            label: self.label,
            family: self.family,
            compute: self.compute,
        }
    }
}

impl<T: ChemistryToolkit> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("family", &self.family)
            .finish()
    }
}

pub struct DescriptorRegistry<T: ChemistryToolkit> {
    descriptors: Vec<Descriptor<T>>,
    schema: Arc<Schema>,
}

impl<T: ChemistryToolkit> Clone for DescriptorRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            descriptors: self.descriptors.clone(),
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<T: ChemistryToolkit> fmt::Debug for DescriptorRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptors.iter().map(|d| d.name)).finish()
    }
}

impl<T: ChemistryToolkit> DescriptorRegistry<T> {
    pub fn new(descriptors: Vec<Descriptor<T>>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for d in &descriptors {
            if !seen.insert(d.name) {
                return Err(RegistryError::DuplicateName(d.name.to_string()));
            }
        }
        Ok(Self {
            schema: schema_of(&descriptors),
            descriptors,
        })
    }

    /// Two scalar descriptors, 13 functional groups and 5 reaction classes.
    pub fn standard() -> Self {
        let descriptors = standard_descriptors();
        Self {
            schema: schema_of(&descriptors),
            descriptors,
        }
    }

    /// Appends a descriptor, keeping names unique.
    pub fn with(mut self, descriptor: Descriptor<T>) -> Result<Self, RegistryError> {
        self.descriptors.push(descriptor);
        Self::new(self.descriptors)
    }

    pub fn descriptors(&self) -> &[Descriptor<T>] {
        &self.descriptors
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor<T>> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.name)
    }

    pub fn family(&self, family: Family) -> impl Iterator<Item = &Descriptor<T>> + '_ {
        self.descriptors.iter().filter(move |d| d.family == family)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn schema_of<T: ChemistryToolkit>(descriptors: &[Descriptor<T>]) -> Arc<Schema> {
    Arc::new(Schema::new(
        descriptors
            .iter()
            .map(|d| Column {
                name: d.name.to_string(),
                label: d.label.to_string(),
                family: d.family,
            })
            .collect(),
    ))
}

fn standard_descriptors<T: ChemistryToolkit>() -> Vec<Descriptor<T>> {
    use Family::*;
    let d = |name, label, family, compute: DetectorFn<T>| Descriptor {
        name,
        label,
        family,
        compute,
    };
    vec![
        d("logp", "LogP", Scalar, logp::<T>),
        d("molwt", "MolWt", Scalar, molwt::<T>),
        d("NH2", "Primary amine", FunctionalGroup, primary_amine::<T>),
        d("NR2", "Tertiary amine", FunctionalGroup, tertiary_amine::<T>),
        d("OH", "Alcohol / phenol", FunctionalGroup, hydroxyl::<T>),
        d("OR", "Ether", FunctionalGroup, ether::<T>),
        d("SH", "Thiol", FunctionalGroup, thiol::<T>),
        d("SR", "Sulfide", FunctionalGroup, sulfide::<T>),
        d("NO2", "Nitro", FunctionalGroup, nitro::<T>),
        d("CN", "Nitrile", FunctionalGroup, nitrile::<T>),
        d("SO3H", "Sulfonic acid", FunctionalGroup, sulfonic_acid::<T>),
        d("CF3", "Trifluoromethyl", FunctionalGroup, trifluoromethyl::<T>),
        d("COOH", "Carboxylic acid", FunctionalGroup, carboxylic_acid::<T>),
        d("F", "Fluoro", FunctionalGroup, fluoro::<T>),
        d("Br", "Bromo", FunctionalGroup, bromo::<T>),
        d("suzuki-miyaura", "Suzuki-Miyaura", ReactionClass, suzuki_miyaura::<T>),
        d("buchwald-hartwig", "Buchwald-Hartwig", ReactionClass, buchwald_hartwig::<T>),
        d(
            "schotten-baumann-amide",
            "Schotten-Baumann Amide",
            ReactionClass,
            schotten_baumann_amide::<T>,
        ),
        d("reductive-amination", "Reductive Amination", ReactionClass, reductive_amination::<T>),
        d("mida-deprotection", "MIDA Deprotection", ReactionClass, mida_deprotection::<T>),
    ]
}

pub const NH2: &[&str] = &["[NH2,nH2]"];
pub const NR2: &[&str] = &["c(N(C)(C))", "C(N(C)(C))"];
pub const OH: &[&str] = &["c[OH1]", "[C!$(C=O)]-[OH]"];
pub const OR: &[&str] = &["c(OC)", "C(OC)"];
pub const SH: &[&str] = &["[SH]"];
pub const SR: &[&str] = &["[#16X2H0]"];
pub const NO2: &[&str] = &["[$([NX3](=O)=O),$([NX3+](=O)[O-])][!#8]"];
pub const CN: &[&str] = &["C#N"];
pub const SO3H: &[&str] = &["S(=O)(=O)(O)"];
pub const CF3: &[&str] = &["FC(F)(F)"];
pub const COOH: &[&str] = &["c-C(=O)[O;H1,-1]"];
pub const F: &[&str] = &["c(F)", "C(F)"];
pub const BR: &[&str] = &["c(Br)"];

pub const SUZUKI_MIYAURA: &[&str] = &["[#6;H0;D3:1]B([OH])[OH]", "[#6;H0;D3:2][Br,I,Cl]"];
pub const BUCHWALD_HARTWIG: &[&str] = &[
    "[Cl,Br,I][c;$(c1:[c,n]:[c,n]:[c,n]:[c,n]:[c,n]:1):1]",
    "[N;$(NC)&!$(N=*)&!$([N-])&!$(N#*)&!$([ND3])&!$([ND4])&!$(N[c,O])&!$(N[C,S]=[S,O,N]),H2&$(Nc1:[c,n]:[c,n]:[c,n]:[c,n]:[c,n]:1):2]",
];
pub const SCHOTTEN_BAUMANN_AMIDE: &[&str] = &[
    "[C;$(C=O):1][OH1]",
    "[N;$(N[#6]);!$(N=*);!$([N-]);!$(N#*);!$([ND3]);!$([ND4]);!$(N[O,N]);!$(N[C,S]=[S,O,N]):2]",
];
pub const REDUCTIVE_AMINATION: &[&str] = &[
    "[#6:4]-[C;H1,$([CH0](-[#6])[#6]):1]=[OD1]",
    "[N;H2,$([NH1;D2](C)C);!$(N-[#6]=[*]):3]-[C:5]",
];
pub const MIDA_DEPROTECTION: &[&str] = &["[#6:1]B12OC(=O)C[N+](C)1CC(=O)O2"];

/// Unique matches summed over `patterns`.
pub fn count_patterns<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    patterns: &[&str],
) -> Result<u32, ToolkitError> {
    patterns.iter().try_fold(0u32, |acc, p| {
        Ok(acc.saturating_add(tk.substructure_match_count(mol, p)?))
    })
}

fn groups<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    patterns: &[&str],
) -> Result<FeatureValue, ToolkitError> {
    count_patterns(tk, mol, patterns).map(|n| FeatureValue::Count(i64::from(n)))
}

fn logp<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    config: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    Ok(FeatureValue::Scalar(round_to(tk.log_p(mol), config.logp_decimals)))
}

fn molwt<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    Ok(FeatureValue::Scalar(tk.exact_weight(mol)))
}

fn primary_amine<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, NH2)
}

fn tertiary_amine<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, NR2)
}

fn hydroxyl<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, OH)
}

fn ether<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, OR)
}

fn thiol<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, SH)
}

fn sulfide<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, SR)
}

fn nitro<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, NO2)
}

fn nitrile<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, CN)
}

fn sulfonic_acid<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, SO3H)
}

fn trifluoromethyl<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, CF3)
}

fn carboxylic_acid<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, COOH)
}

/// C-F and c-F bonds, minus the three counted for each CF3 group.
///
/// Not clamped: a carbon bearing four fluorines matches the CF3 pattern four
/// times, so CF4 comes out at -8.
fn fluoro<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    let total = i64::from(count_patterns(tk, mol, F)?);
    let cf3 = i64::from(count_patterns(tk, mol, CF3)?);
    Ok(FeatureValue::Count(total - 3 * cf3))
}

fn bromo<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, BR)
}

fn suzuki_miyaura<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, SUZUKI_MIYAURA)
}

fn buchwald_hartwig<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, BUCHWALD_HARTWIG)
}

fn schotten_baumann_amide<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, SCHOTTEN_BAUMANN_AMIDE)
}

fn reductive_amination<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, REDUCTIVE_AMINATION)
}

fn mida_deprotection<T: ChemistryToolkit>(
    tk: &T,
    mol: &T::Molecule,
    _: &PipelineConfig,
) -> Result<FeatureValue, ToolkitError> {
    groups(tk, mol, MIDA_DEPROTECTION)
}
