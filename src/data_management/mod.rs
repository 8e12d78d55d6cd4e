/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// data_managment module
//
// functions to read and write from file system
//
////////////////////////////////////////////////////////////////////////////////////

use super::error::ContagionError;
use super::utilities::{beta_mv_to_ab, RandomSource};
use super::world::{ContactGraph, MitigationScope, Person};
use csv::{Reader, ReaderBuilder, Trim};
use log::{debug, info};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution, Pert};
use serde::Deserialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use yaml_rust::{Yaml, YamlLoader};

// -------------------------------- File paths -------------------------------------------------------------
pub struct ModelDataStore {
    model_root: PathBuf,
    parameter_file: PathBuf,
    scenario_dir: PathBuf,
}

impl ModelDataStore {
    // file paths start at model_root
    // the scenario folder is recreated from scratch
    pub fn new(model_root: &str) -> Result<ModelDataStore, ContagionError> {
        let model_root = PathBuf::from(model_root);
        if !model_root.is_dir() {
            return Err(ContagionError::Parameter(format!(
                "model root {} is not a directory",
                model_root.display()
            )));
        }
        let parameter_file = model_root.join("parms.yaml");
        let scenario_dir = model_root.join("Scenarios");

        if scenario_dir.exists() {
            debug!("removing previous runs in {}", scenario_dir.display());
            fs::remove_dir_all(&scenario_dir)?;
        }
        fs::create_dir(&scenario_dir)?;

        Ok(ModelDataStore {
            model_root,
            parameter_file,
            scenario_dir,
        })
    }

    pub fn get_model_parms(&self) -> Result<ModelParameters, ContagionError> {
        let mut parm_string = String::new();
        File::open(&self.parameter_file)
            .and_then(|mut f| f.read_to_string(&mut parm_string))
            .map_err(|e| {
                ContagionError::Parameter(format!(
                    "cannot read parm file {} - {}",
                    self.parameter_file.display(),
                    e
                ))
            })?;
        ModelParameters::from_yaml_str(&parm_string, &self.model_root)
    }

    fn get_scenario_directory(&self, scenario_number: usize, kind: ScenarioKind) -> PathBuf {
        self.scenario_dir
            .join(format!("scenario_{:04}_{}", scenario_number, kind.key()))
    }

    pub fn create_scenario_directory(
        &self,
        scenario_number: usize,
        kind: ScenarioKind,
    ) -> Result<PathBuf, ContagionError> {
        let dir_full_path = self.get_scenario_directory(scenario_number, kind);
        if !dir_full_path.exists() {
            fs::create_dir(&dir_full_path)?;
        }
        Ok(dir_full_path)
    }
}

// ----------------------------- Scenario parameters -------------------------------------------------------
//
//  A model run is a series of scenarios played against the same population
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScenarioKind {
    Baseline,
    Mitigation,
}
impl ScenarioKind {
    fn key(self) -> &'static str {
        match self {
            ScenarioKind::Baseline => "baseline",
            ScenarioKind::Mitigation => "mitigation",
        }
    }
}
impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
impl FromStr for ScenarioKind {
    type Err = ContagionError;

    fn from_str(s: &str) -> Result<ScenarioKind, ContagionError> {
        match s {
            "baseline" => Ok(ScenarioKind::Baseline),
            "mitigation" => Ok(ScenarioKind::Mitigation),
            _ => Err(ContagionError::Parameter(format!("unknown scenario '{}'", s))),
        }
    }
}

fn parse_mitigation_scope(s: &str) -> Result<MitigationScope, ContagionError> {
    match s {
        "first_contact" => Ok(MitigationScope::FirstContact),
        "all_contacts" => Ok(MitigationScope::AllContacts),
        _ => Err(ContagionError::Parameter(format!(
            "unknown mitigation scope '{}'",
            s
        ))),
    }
}

// Where the population comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationSource {
    Files {
        population_file: PathBuf,
        contacts_file: PathBuf,
        delimiter: u8,
    },
    Synthetic(SyntheticParms),
}

// Random population: ages follow a PERT, spread probabilities a Beta
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParms {
    pub people_count: usize,
    pub contacts_per_person: usize,
    pub age: (f64, f64, f64),          //min, max, mode
    pub spread_prob: (f64, usize),     //mean, sample_population
}

#[derive(Debug, Clone)]
pub struct ModelParameters {
    pub model_name: String,
    pub model_description: String,
    pub steps: usize,
    pub random_seed: Option<u64>,
    pub log_level: Option<String>,
    pub population: PopulationSource,
    pub scenarios: Vec<ScenarioKind>,
    pub mitigation_scope: MitigationScope,
}

impl ModelParameters {
    // relative file names in the yaml are taken relative to model_root
    pub fn from_yaml_str(
        parm_string: &str,
        model_root: &Path,
    ) -> Result<ModelParameters, ContagionError> {
        // the loader creates an array of yaml documents - only the first one interests us
        let docs = YamlLoader::load_from_str(parm_string)?;
        let doc = docs
            .get(0)
            .ok_or_else(|| ContagionError::from("parameter file is empty"))?;

        let model_name = required_str(doc, "model_name")?.to_string();
        let model_description = doc["model_description"].as_str().unwrap_or("").to_string();
        let steps = required_usize(&doc["steps"], "steps")?;
        let random_seed = match &doc["random_seed"] {
            Yaml::BadValue | Yaml::Null => None,
            v => Some(required_usize(v, "random_seed")? as u64),
        };
        let log_level = doc["log_level"].as_str().map(String::from);

        // parse - population --------------------------------------------------
        let population = if !doc["population"].is_badvalue() {
            let p = &doc["population"];
            let delimiter = match p["delimiter"].as_str() {
                None => b',',
                Some(d) if d.len() == 1 => d.as_bytes()[0],
                Some(d) => {
                    return Err(ContagionError::Parameter(format!(
                        "delimiter must be a single character, got '{}'",
                        d
                    )))
                }
            };
            PopulationSource::Files {
                population_file: model_root.join(required_str(p, "population_file")?),
                contacts_file: model_root.join(required_str(p, "contacts_file")?),
                delimiter,
            }
        } else if !doc["synthetic_population"].is_badvalue() {
            let sp = &doc["synthetic_population"];
            PopulationSource::Synthetic(SyntheticParms {
                people_count: required_usize(&sp["people_count"], "people_count")?,
                contacts_per_person: required_usize(
                    &sp["contacts_per_person"],
                    "contacts_per_person",
                )?,
                age: (
                    required_f64(&sp["age"]["min"], "age min")?,
                    required_f64(&sp["age"]["max"], "age max")?,
                    required_f64(&sp["age"]["mode"], "age mode")?,
                ),
                spread_prob: (
                    required_f64(&sp["spread_prob"]["mean"], "spread_prob mean")?,
                    required_usize(
                        &sp["spread_prob"]["sample_population"],
                        "spread_prob sample_population",
                    )?,
                ),
            })
        } else {
            return Err(ContagionError::from(
                "either 'population' or 'synthetic_population' must be given",
            ));
        };

        // parse - scenarios ---------------------------------------------------
        let scenarios = match doc["scenarios"].as_vec() {
            None => vec![ScenarioKind::Baseline],
            Some(list) => list
                .iter()
                .map(|s| {
                    s.as_str()
                        .ok_or_else(|| ContagionError::from("scenario names must be strings"))
                        .and_then(str::parse)
                })
                .collect::<Result<Vec<ScenarioKind>, ContagionError>>()?,
        };
        let mitigation_scope = match doc["mitigation_scope"].as_str() {
            None => MitigationScope::default(),
            Some(s) => parse_mitigation_scope(s)?,
        };

        Ok(ModelParameters {
            model_name,
            model_description,
            steps,
            random_seed,
            log_level,
            population,
            scenarios,
            mitigation_scope,
        })
    }
}

impl fmt::Display for ModelParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let population = match &self.population {
            PopulationSource::Files {
                population_file, ..
            } => format!("from {}", population_file.display()),
            PopulationSource::Synthetic(sp) => format!("{} synthetic people", sp.people_count),
        };
        write!(
            f,
            "Model name {}\nModel description {}\nPopulation {}\nScenarios {:?} of {} steps",
            self.model_name, self.model_description, population, self.scenarios, self.steps
        )
    }
}

fn required_str<'a>(node: &'a Yaml, key: &str) -> Result<&'a str, ContagionError> {
    node[key]
        .as_str()
        .ok_or_else(|| ContagionError::Parameter(format!("YAML - expected '{}' parameter", key)))
}

fn required_usize(node: &Yaml, name: &str) -> Result<usize, ContagionError> {
    match node.as_i64() {
        Some(v) if v >= 0 => Ok(v as usize),
        _ => Err(ContagionError::Parameter(format!(
            "YAML - expected a non-negative integer for '{}'",
            name
        ))),
    }
}

// yaml keeps integers and reals apart - accept both
fn required_f64(node: &Yaml, name: &str) -> Result<f64, ContagionError> {
    node.as_f64()
        .or_else(|| node.as_i64().map(|v| v as f64))
        .ok_or_else(|| {
            ContagionError::Parameter(format!("YAML - expected a number for '{}'", name))
        })
}

// ----------------------------- Population input ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationRecord {
    pub name: String,
    pub age: u32,
    pub spread_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactRecord {
    pub from: String,
    pub to: String,
}

// headerless, '#' comments, fields trimmed
// with a space delimiter any run of spaces or tabs separates two fields
fn delimited_reader<R: Read>(
    mut reader: R,
    delimiter: u8,
) -> Result<Reader<Cursor<Vec<u8>>>, ContagionError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    if delimiter == b' ' {
        text = text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");
    }
    let rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(Cursor::new(text.into_bytes()));
    Ok(rdr)
}

// name, age, spread probability - one person per line
pub fn read_population<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<PopulationRecord>, ContagionError> {
    let mut rdr = delimited_reader(reader, delimiter)?;
    let mut people = Vec::new();
    for result in rdr.deserialize() {
        let record: PopulationRecord = result?;
        if !(0.0..=1.0).contains(&record.spread_prob) {
            return Err(ContagionError::Parameter(format!(
                "spread probability {} of {} is outside [0, 1]",
                record.spread_prob, record.name
            )));
        }
        people.push(record);
    }
    Ok(people)
}

// from, to - one contact per line
pub fn read_contacts<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<ContactRecord>, ContagionError> {
    let mut rdr = delimited_reader(reader, delimiter)?;
    let mut contacts = Vec::new();
    for result in rdr.deserialize() {
        contacts.push(result?);
    }
    Ok(contacts)
}

// Generates people named `p0000`, `p0001`... each with `contacts_per_person`
// distinct contacts picked at random among the others.
pub fn synthetic_population<G: Rng>(
    parms: &SyntheticParms,
    rng: &mut G,
) -> Result<PopulationData, ContagionError> {
    let (min, max, mode) = parms.age;
    let age_dist = Pert::new(min, max, mode)
        .map_err(|e| ContagionError::Parameter(format!("age PERT - {:?}", e)))?;
    let (alpha, beta) = beta_mv_to_ab(parms.spread_prob.0, parms.spread_prob.1);
    let spread_dist = Beta::new(alpha, beta)
        .map_err(|e| ContagionError::Parameter(format!("spread probability beta - {:?}", e)))?;

    let people: Vec<PopulationRecord> = (0..parms.people_count)
        .map(|i| PopulationRecord {
            name: format!("p{:04}", i),
            age: age_dist.sample(rng).round().max(0.0) as u32,
            spread_prob: spread_dist.sample(rng),
        })
        .collect();

    let contact_count = parms
        .contacts_per_person
        .min(parms.people_count.saturating_sub(1));
    let mut contacts = Vec::with_capacity(parms.people_count * contact_count);
    for (i, person) in people.iter().enumerate() {
        let others: Vec<usize> = (0..people.len()).filter(|&j| j != i).collect();
        for &j in others.choose_multiple(rng, contact_count) {
            contacts.push(ContactRecord {
                from: person.name.clone(),
                to: people[j].name.clone(),
            });
        }
    }

    Ok(PopulationData { people, contacts })
}

// The two tuple streams the graph is built from
#[derive(Debug, Clone, Default)]
pub struct PopulationData {
    pub people: Vec<PopulationRecord>,
    pub contacts: Vec<ContactRecord>,
}

impl PopulationData {
    pub fn load(
        source: &PopulationSource,
        random_seed: Option<u64>,
    ) -> Result<PopulationData, ContagionError> {
        let data = match source {
            PopulationSource::Files {
                population_file,
                contacts_file,
                delimiter,
            } => {
                let people = read_population(open(population_file)?, *delimiter)?;
                let contacts = read_contacts(open(contacts_file)?, *delimiter)?;
                PopulationData { people, contacts }
            }
            PopulationSource::Synthetic(parms) => {
                let mut rng = match random_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                synthetic_population(parms, &mut rng)?
            }
        };
        info!(
            "loaded {} people and {} contacts",
            data.people.len(),
            data.contacts.len()
        );
        Ok(data)
    }

    // Adds every person, then every contact, then derives the probabilities.
    pub fn build_graph<R: RandomSource>(&self, rng: R) -> Result<ContactGraph<R>, ContagionError> {
        let mut graph = ContactGraph::with_random_source(rng);
        for p in &self.people {
            graph.add_node(Person::new(&p.name, p.age, p.spread_prob))?;
        }
        for c in &self.contacts {
            graph.add_edge(&c.from, &c.to)?;
        }
        graph.derive_probabilities()?;
        Ok(graph)
    }
}

fn open(path: &Path) -> Result<File, ContagionError> {
    File::open(path).map_err(|e| {
        ContagionError::Parameter(format!("cannot open {} - {}", path.display(), e))
    })
}
