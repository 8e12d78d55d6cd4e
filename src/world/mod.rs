/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// world module
//
// the world is a contact graph: a populace of people and, for each person,
// the list of people they can infect (their victims)
//
// In each step - infected people infect their contacts, infected people get sick
// (or sicker), sick people recover
//
////////////////////////////////////////////////////////////////////////////////////

use super::error::ContagionError;
use super::stats::{Counts, StatisticsSnapshot};
use super::utilities::{simulate_prob, RandomSource, StdRandom};
use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::fmt;

// Days a person can stay sick. Past this they are dead.
pub const SICKNESS_WINDOW: u32 = 7;

// Contacts older than this fraction of the oldest person count as elders
// for the mitigation policy.
pub const ELDER_AGE_FRACTION: f64 = 0.35;

// bound on the random draws `step` makes when it has to seed an outbreak itself
const SEED_ATTEMPTS_PER_PERSON: usize = 100;

// ContactGraph ---------------------------------------------------------------------------------------------

// Which of a person's contacts the mitigation policy looks at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MitigationScope {
    // Only the first victim in the list.
    FirstContact,
    // Any victim in the list.
    AllContacts,
}

impl Default for MitigationScope {
    fn default() -> Self {
        MitigationScope::FirstContact
    }
}

// The populace and, for each person, who they can infect
// build order: add_node for everyone, add_edge for every contact, derive_probabilities once
// then step as often as needed
pub struct ContactGraph<R = StdRandom> {
    populace: Vec<Person>,
    name_index: HashMap<String, PersonId>,
    max_age: u32,
    cases_recorded: usize,
    sick_recorded: usize,
    recoveries_recorded: usize,
    steps_run: usize,
    probabilities_derived: bool,
    mitigation_scope: MitigationScope,
    rng: R,
}

impl ContactGraph<StdRandom> {
    pub fn new() -> ContactGraph<StdRandom> {
        ContactGraph::with_random_source(StdRandom::from_entropy())
    }

    pub fn with_seed(seed: u64) -> ContactGraph<StdRandom> {
        ContactGraph::with_random_source(StdRandom::with_seed(seed))
    }
}

impl Default for ContactGraph<StdRandom> {
    fn default() -> Self {
        ContactGraph::new()
    }
}

impl<R: RandomSource> ContactGraph<R> {
    pub fn with_random_source(rng: R) -> ContactGraph<R> {
        ContactGraph {
            populace: Vec::new(),
            name_index: HashMap::new(),
            max_age: 1,
            cases_recorded: 0,
            sick_recorded: 0,
            recoveries_recorded: 0,
            steps_run: 0,
            probabilities_derived: false,
            mitigation_scope: MitigationScope::default(),
            rng,
        }
    }

    // ---- construction ----

    // fails if the name is taken or probabilities were already derived
    pub fn add_node(&mut self, person: Person) -> Result<PersonId, ContagionError> {
        if self.probabilities_derived {
            return Err(ContagionError::PopulationSealed(person.name));
        }
        if self.name_index.contains_key(&person.name) {
            return Err(ContagionError::DuplicatePerson(person.name));
        }

        let id = PersonId(self.populace.len());
        if person.age > self.max_age {
            self.max_age = person.age;
        }
        trace!("adding {} (age {}) as {:?}", person.name, person.age, id);
        self.name_index.insert(person.name.clone(), id);
        self.populace.push(person);
        Ok(id)
    }

    // Adds a directed edge: `from_name` can infect `to_name`.
    pub fn add_edge(&mut self, from_name: &str, to_name: &str) -> Result<(), ContagionError> {
        let from = self.lookup(from_name)?;
        let to = self.lookup(to_name)?;
        self.populace[from.0].victims.push(to);
        Ok(())
    }

    // Sets `disease_prob` and `recovery_prob` for everyone from the oldest age.
    // Runs once per graph.
    pub fn derive_probabilities(&mut self) -> Result<(), ContagionError> {
        if self.probabilities_derived {
            return Err(ContagionError::ProbabilitiesAlreadyDerived);
        }
        self.probabilities_derived = true;

        if self.populace.is_empty() {
            warn!("deriving probabilities for an empty population");
            return Ok(());
        }

        let max_age = self.max_age as f64;
        for person in self.populace.iter_mut() {
            person.disease_prob = person.age as f64 / max_age;
            person.recovery_prob = 1.0 - person.disease_prob;
        }
        debug!(
            "derived probabilities for {} people (oldest {})",
            self.populace.len(),
            self.max_age
        );
        Ok(())
    }

    pub fn set_mitigation_scope(&mut self, scope: MitigationScope) {
        self.mitigation_scope = scope;
    }

    pub fn mitigation_scope(&self) -> MitigationScope {
        self.mitigation_scope
    }

    // ---- seeding ----

    // infect one person picked at random, if they have someone to infect
    // false (and nothing touched) when the pick has no victims or the populace is empty
    pub fn seed_outbreak(&mut self) -> bool {
        if self.populace.is_empty() {
            return false;
        }
        let pick = PersonId(self.rng.index(self.populace.len()));
        self.try_seed(pick)
    }

    // same as seed_outbreak for a named person
    pub fn seed_outbreak_at(&mut self, name: &str) -> Result<bool, ContagionError> {
        let id = self.lookup(name)?;
        Ok(self.try_seed(id))
    }

    fn try_seed(&mut self, id: PersonId) -> bool {
        let person = &mut self.populace[id.0];
        if person.victims.is_empty() || !person.is_susceptible() {
            return false;
        }
        person.infected = true;
        self.cases_recorded += 1;
        info!("patient zero is {}", person.name);
        true
    }

    // keep seeding until it takes, or until it is clear it never will
    fn ensure_seeded(&mut self) -> Result<(), ContagionError> {
        if self.populace.is_empty() {
            return Err(ContagionError::EmptyPopulation);
        }
        if self.populace.iter().all(|p| p.victims.is_empty()) {
            return Err(ContagionError::Unseedable);
        }
        let attempts = self.populace.len() * SEED_ATTEMPTS_PER_PERSON;
        for _ in 0..attempts {
            if self.seed_outbreak() {
                return Ok(());
            }
        }
        warn!("gave up seeding after {} attempts", attempts);
        Err(ContagionError::Unseedable)
    }

    // ---- simulation ----

    // one step: transmission, then onset/progression, then recovery
    // seeds an outbreak first if no case has been recorded yet
    pub fn step(&mut self) -> Result<(), ContagionError> {
        if !self.probabilities_derived {
            return Err(ContagionError::ProbabilitiesNotDerived);
        }
        if self.cases_recorded == 0 {
            self.ensure_seeded()?;
        }

        let new_cases = self.infection_simulation();
        let new_sick = self.get_sick_simulation();
        let recoveries = self.recovery_simulation();
        self.steps_run += 1;

        debug!(
            "step {}: {} new cases, {} fell sick, {} recovered",
            self.steps_run, new_cases, new_sick, recoveries
        );
        Ok(())
    }

    // Infected and sick people try to infect each susceptible victim.
    // Sources are fixed at the start of the pass so the infection moves one hop per
    // step; victims are checked live so nobody is infected twice in one pass.
    fn infection_simulation(&mut self) -> usize {
        let sources: Vec<PersonId> = self
            .populace
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_contagious())
            .map(|(i, _)| PersonId(i))
            .collect();

        let mut new_cases = 0;
        for source in sources {
            let spread_prob = self.populace[source.0].spread_prob;
            for v in 0..self.populace[source.0].victims.len() {
                let victim = self.populace[source.0].victims[v];
                if !self.populace[victim.0].is_susceptible() {
                    continue;
                }
                if simulate_prob(&mut self.rng, spread_prob) {
                    self.populace[victim.0].infected = true;
                    self.cases_recorded += 1;
                    new_cases += 1;
                    trace!(
                        "{} infected {}",
                        self.populace[source.0].name,
                        self.populace[victim.0].name
                    );
                }
            }
        }
        new_cases
    }

    // Carriers fall sick with their disease probability, the sick get one day sicker.
    fn get_sick_simulation(&mut self) -> usize {
        let mut new_sick = 0;
        for person in self.populace.iter_mut() {
            match person.status() {
                DiseaseStatus::Infected => {
                    if simulate_prob(&mut self.rng, person.disease_prob) {
                        person.days_sick = 1;
                        self.sick_recorded += 1;
                        new_sick += 1;
                    }
                }
                DiseaseStatus::Sick => {
                    person.days_sick += 1;
                    if person.days_sick > SICKNESS_WINDOW {
                        trace!("{} died", person.name);
                    }
                }
                DiseaseStatus::Susceptible | DiseaseStatus::Dead => (),
            }
        }
        new_sick
    }

    // The sick (not the dead) recover with their recovery probability.
    fn recovery_simulation(&mut self) -> usize {
        let mut recoveries = 0;
        for person in self.populace.iter_mut() {
            if person.status() == DiseaseStatus::Sick
                && simulate_prob(&mut self.rng, person.recovery_prob)
            {
                person.infected = false;
                person.days_sick = 0;
                self.recoveries_recorded += 1;
                recoveries += 1;
            }
        }
        recoveries
    }

    // Puts everyone back to susceptible and zeroes the counters.
    // Contacts and probabilities are kept.
    pub fn reset(&mut self) {
        for person in self.populace.iter_mut() {
            person.infected = false;
            person.days_sick = 0;
        }
        self.cases_recorded = 0;
        self.sick_recorded = 0;
        self.recoveries_recorded = 0;
        self.steps_run = 0;
        debug!("population reset");
    }

    // reset, halve the spread probability of everyone in contact with an elder, run one step
    // the mitigation scope decides which contacts are checked; halving compounds across calls
    // returns how many people were distanced
    pub fn mitigation_policy(&mut self) -> Result<usize, ContagionError> {
        self.reset();

        let elder_age = ELDER_AGE_FRACTION * self.max_age as f64;
        let ages: Vec<u32> = self.populace.iter().map(|p| p.age).collect();
        let is_elder = |id: &PersonId| ages[id.0] as f64 > elder_age;

        let mut distanced = 0;
        for person in self.populace.iter_mut() {
            let exposed = match self.mitigation_scope {
                MitigationScope::FirstContact => person.victims.first().map_or(false, is_elder),
                MitigationScope::AllContacts => person.victims.iter().any(is_elder),
            };
            if exposed {
                person.spread_prob /= 2.0;
                distanced += 1;
            }
        }
        info!(
            "mitigation: {} of {} people distanced ({:?})",
            distanced,
            self.populace.len(),
            self.mitigation_scope
        );

        self.step()?;
        Ok(distanced)
    }

    // ---- queries ----

    // People infected but not yet sick.
    pub fn infected_count(&self) -> usize {
        self.count(DiseaseStatus::Infected)
    }

    pub fn sick_count(&self) -> usize {
        self.count(DiseaseStatus::Sick)
    }

    pub fn dead_count(&self) -> usize {
        self.count(DiseaseStatus::Dead)
    }

    // Everyone neither infected, sick, nor dead.
    pub fn healthy_count(&self) -> usize {
        self.populace.len() - self.infected_count() - self.sick_count() - self.dead_count()
    }

    fn count(&self, status: DiseaseStatus) -> usize {
        self.populace.iter().filter(|p| p.status() == status).count()
    }

    pub fn cases_recorded(&self) -> usize {
        self.cases_recorded
    }

    pub fn sick_recorded(&self) -> usize {
        self.sick_recorded
    }

    pub fn recoveries_recorded(&self) -> usize {
        self.recoveries_recorded
    }

    pub fn statistics_snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot::from_counts(Counts {
            population: self.populace.len(),
            cases: self.cases_recorded,
            sick_cases: self.sick_recorded,
            recoveries: self.recoveries_recorded,
            infected: self.infected_count(),
            sick: self.sick_count(),
            dead: self.dead_count(),
        })
    }

    pub fn steps_run(&self) -> usize {
        self.steps_run
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn probabilities_derived(&self) -> bool {
        self.probabilities_derived
    }

    pub fn len(&self) -> usize {
        self.populace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populace.is_empty()
    }

    pub fn persons(&self) -> &[Person] {
        &self.populace
    }

    pub fn person(&self, name: &str) -> Option<&Person> {
        self.name_index.get(name).map(|id| &self.populace[id.0])
    }

    // Each person's name with the number of people they can infect.
    pub fn contact_counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.populace
            .iter()
            .map(|p| (p.name.as_str(), p.victims.len()))
    }

    fn lookup(&self, name: &str) -> Result<PersonId, ContagionError> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| ContagionError::UnknownContact(name.to_string()))
    }
}

// one line per person: "name  |  victim,victim."
impl<R> fmt::Display for ContactGraph<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for person in &self.populace {
            write!(f, "{}", person.name)?;
            if !person.victims.is_empty() {
                let names: Vec<&str> = person
                    .victims
                    .iter()
                    .map(|v| self.populace[v.0].name.as_str())
                    .collect();
                write!(f, "  |  {}.", names.join(","))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<R> fmt::Debug for ContactGraph<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ContactGraph")
            .field("population", &self.populace.len())
            .field("max_age", &self.max_age)
            .field("cases_recorded", &self.cases_recorded)
            .field("sick_recorded", &self.sick_recorded)
            .field("recoveries_recorded", &self.recoveries_recorded)
            .field("steps_run", &self.steps_run)
            .finish()
    }
}

// Person ---------------------------------------------------------------------------------------------------

// Index of a person in the populace.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PersonId(pub(crate) usize);


#[derive(Debug, Clone)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub spread_prob: f64,
    pub disease_prob: f64,
    pub recovery_prob: f64,
    // infected and days_sick together give the disease status - see status()
    pub infected: bool,
    pub days_sick: u32,
    victims: Vec<PersonId>,
}

impl Person {
    pub fn new(name: &str, age: u32, spread_prob: f64) -> Person {
        Person {
            name: String::from(name),
            age,
            spread_prob,
            disease_prob: 0.0,
            recovery_prob: 0.0,
            infected: false,
            days_sick: 0,
            victims: Vec::new(),
        }
    }

    pub fn status(&self) -> DiseaseStatus {
        match (self.infected, self.days_sick) {
            (false, _) => DiseaseStatus::Susceptible,
            (true, 0) => DiseaseStatus::Infected,
            (true, d) if d <= SICKNESS_WINDOW => DiseaseStatus::Sick,
            (true, _) => DiseaseStatus::Dead,
        }
    }

    pub fn is_susceptible(&self) -> bool {
        self.status() == DiseaseStatus::Susceptible
    }

    // infected or sick, but not dead
    pub fn is_contagious(&self) -> bool {
        matches!(self.status(), DiseaseStatus::Infected | DiseaseStatus::Sick)
    }

    pub fn victims(&self) -> &[PersonId] {
        &self.victims
    }
}

// name, age and spread probability identify a person; state and contacts do not
impl PartialEq for Person {
    fn eq(&self, other: &Person) -> bool {
        self.name == other.name && self.age == other.age && self.spread_prob == other.spread_prob
    }
}

// Disease -------------------------------------------------------------------------------------------
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiseaseStatus {
    Susceptible,
    Infected,
    Sick,
    Dead,
}
impl fmt::Display for DiseaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::ScriptedRandom;

    // a -> b -> c with ages 10, 30, 50
    fn chain<R: RandomSource>(rng: R) -> ContactGraph<R> {
        let mut graph = ContactGraph::with_random_source(rng);
        graph.add_node(Person::new("A", 10, 0.5)).unwrap();
        graph.add_node(Person::new("B", 30, 0.5)).unwrap();
        graph.add_node(Person::new("C", 50, 0.5)).unwrap();
        graph.add_edge("A", "B").unwrap();
        graph.add_edge("B", "C").unwrap();
        graph.derive_probabilities().unwrap();
        graph
    }

    #[test]
    fn new_person_is_susceptible() {
        let person = Person::new("A", 40, 0.3);
        assert_eq!(person.status(), DiseaseStatus::Susceptible);
        assert_eq!(person.days_sick, 0);
        assert!(person.victims().is_empty());
    }

    #[test]
    fn status_covers_every_combination() {
        let mut person = Person::new("A", 40, 0.3);
        person.infected = true;
        assert_eq!(person.status(), DiseaseStatus::Infected);
        for day in 1..=SICKNESS_WINDOW {
            person.days_sick = day;
            assert_eq!(person.status(), DiseaseStatus::Sick);
        }
        person.days_sick = SICKNESS_WINDOW + 1;
        assert_eq!(person.status(), DiseaseStatus::Dead);
        assert!(!person.is_contagious());
    }

    #[test]
    fn equality_ignores_state() {
        let a = Person::new("A", 40, 0.3);
        let mut b = Person::new("A", 40, 0.3);
        b.infected = true;
        assert_eq!(a, b);
        assert_ne!(a, Person::new("A", 41, 0.3));
        assert_ne!(a, Person::new("A", 40, 0.4));
    }

    #[test]
    fn derived_probabilities_follow_age() {
        let graph = chain(StdRandom::with_seed(1));
        assert_eq!(graph.max_age(), 50);
        let a = graph.person("A").unwrap();
        assert!((a.disease_prob - 0.2).abs() < 1e-9);
        assert!((a.recovery_prob - 0.8).abs() < 1e-9);
        assert!((graph.person("C").unwrap().disease_prob - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_contact_is_rejected() {
        let mut graph = ContactGraph::with_seed(1);
        graph.add_node(Person::new("A", 10, 0.5)).unwrap();
        match graph.add_edge("A", "Z") {
            Err(ContagionError::UnknownContact(name)) => assert_eq!(name, "Z"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(graph.add_edge("Q", "A").is_err());
        assert!(graph.person("A").unwrap().victims().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut graph = ContactGraph::with_seed(1);
        graph.add_node(Person::new("A", 10, 0.5)).unwrap();
        assert!(matches!(
            graph.add_node(Person::new("A", 20, 0.1)),
            Err(ContagionError::DuplicatePerson(_))
        ));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn probabilities_are_derived_once() {
        let mut graph = chain(StdRandom::with_seed(1));
        assert!(matches!(
            graph.derive_probabilities(),
            Err(ContagionError::ProbabilitiesAlreadyDerived)
        ));
        assert!(matches!(
            graph.add_node(Person::new("D", 5, 0.1)),
            Err(ContagionError::PopulationSealed(_))
        ));
    }

    #[test]
    fn step_needs_derived_probabilities() {
        let mut graph = ContactGraph::with_seed(1);
        graph.add_node(Person::new("A", 10, 0.5)).unwrap();
        graph.add_node(Person::new("B", 10, 0.5)).unwrap();
        graph.add_edge("A", "B").unwrap();
        assert!(matches!(
            graph.step(),
            Err(ContagionError::ProbabilitiesNotDerived)
        ));
    }

    #[test]
    fn empty_population_fails_cleanly() {
        let mut graph = ContactGraph::with_seed(1);
        graph.derive_probabilities().unwrap();
        assert!(!graph.seed_outbreak());
        assert!(matches!(graph.step(), Err(ContagionError::EmptyPopulation)));
        assert_eq!(graph.statistics_snapshot().healthy_pct, 100.0);
    }

    #[test]
    fn population_without_edges_is_unseedable() {
        let mut graph = ContactGraph::with_seed(1);
        graph.add_node(Person::new("A", 10, 0.5)).unwrap();
        graph.add_node(Person::new("B", 20, 0.5)).unwrap();
        graph.derive_probabilities().unwrap();
        for _ in 0..50 {
            assert!(!graph.seed_outbreak());
        }
        assert_eq!(graph.cases_recorded(), 0);
        assert!(matches!(graph.step(), Err(ContagionError::Unseedable)));
    }

    #[test]
    fn seeding_skips_people_without_victims() {
        // index draws: 0.9 -> C (no victims), 0.0 -> A
        let mut graph = chain(ScriptedRandom::new(vec![0.9, 0.0]).unwrap());
        assert!(!graph.seed_outbreak());
        assert_eq!(graph.cases_recorded(), 0);
        assert!(graph.seed_outbreak());
        assert_eq!(graph.cases_recorded(), 1);
        assert_eq!(graph.person("A").unwrap().status(), DiseaseStatus::Infected);
    }

    #[test]
    fn scripted_step_follows_each_phase() {
        // every draw is 0.1: transmissions succeed (p=0.5), onset succeeds for B
        // (p=0.6) and recovery succeeds for B (p=0.4)
        let mut graph = chain(ScriptedRandom::new(vec![0.1]).unwrap());
        assert!(graph.seed_outbreak_at("B").unwrap());
        graph.step().unwrap();

        assert_eq!(graph.person("C").unwrap().status(), DiseaseStatus::Sick);
        assert_eq!(graph.person("B").unwrap().status(), DiseaseStatus::Susceptible);
        assert_eq!(graph.person("A").unwrap().status(), DiseaseStatus::Susceptible);
        assert_eq!(graph.cases_recorded(), 2);
        assert_eq!(graph.sick_recorded(), 2);
        assert_eq!(graph.recoveries_recorded(), 1);
    }

    #[test]
    fn infection_moves_one_hop_per_step() {
        let mut graph = chain(ScriptedRandom::new(vec![0.0]).unwrap());
        graph.seed_outbreak_at("A").unwrap();
        graph.step().unwrap();
        // B was infected during the pass but must not pass it on to C yet
        assert_eq!(graph.cases_recorded(), 2);
        assert!(!graph.person("C").unwrap().infected);
    }

    // s -> v, both aged 10 so onset is certain and recovery never happens
    fn pair(s_spread: f64, v_spread: f64, draw: f64) -> ContactGraph<ScriptedRandom> {
        let rng = ScriptedRandom::new(vec![draw]).unwrap();
        let mut graph = ContactGraph::with_random_source(rng);
        graph.add_node(Person::new("S", 10, s_spread)).unwrap();
        graph.add_node(Person::new("V", 10, v_spread)).unwrap();
        graph.add_edge("S", "V").unwrap();
        graph.derive_probabilities().unwrap();
        assert!(graph.seed_outbreak_at("S").unwrap());
        graph
    }

    #[test]
    fn transmission_uses_the_source_spread() {
        let mut graph = pair(1.0, 0.0, 0.5);
        graph.step().unwrap();
        assert_eq!(graph.cases_recorded(), 2);
        assert_eq!(graph.person("V").unwrap().status(), DiseaseStatus::Sick);
    }

    #[test]
    fn victim_spread_does_not_help_transmission() {
        let mut graph = pair(0.0, 1.0, 0.0);
        for _ in 0..3 {
            graph.step().unwrap();
        }
        assert_eq!(graph.cases_recorded(), 1);
        assert!(graph.person("V").unwrap().is_susceptible());
    }

    #[test]
    fn victim_is_only_counted_once_per_pass() {
        let rng = ScriptedRandom::new(vec![0.0]).unwrap();
        let mut graph = ContactGraph::with_random_source(rng);
        for name in &["A", "B", "V"] {
            graph.add_node(Person::new(name, 10, 1.0)).unwrap();
        }
        graph.add_edge("A", "V").unwrap();
        graph.add_edge("B", "V").unwrap();
        graph.derive_probabilities().unwrap();
        graph.seed_outbreak_at("A").unwrap();
        graph.seed_outbreak_at("B").unwrap();
        let before = graph.cases_recorded();
        graph.infection_simulation();
        assert_eq!(graph.cases_recorded(), before + 1);
    }

    #[test]
    fn new_onset_does_not_advance_the_same_step() {
        let mut graph = chain(ScriptedRandom::new(vec![0.0]).unwrap());
        // C has no victims so it cannot be seeded the normal way
        assert!(!graph.seed_outbreak_at("C").unwrap());
        graph.populace[2].infected = true;
        graph.get_sick_simulation();
        assert_eq!(graph.person("C").unwrap().days_sick, 1);
        graph.get_sick_simulation();
        assert_eq!(graph.person("C").unwrap().days_sick, 2);
    }

    #[test]
    fn sick_person_dies_after_the_window() {
        // C is 50, the oldest: disease probability 1, recovery probability 0
        let mut graph = chain(StdRandom::with_seed(9));
        graph.populace[2].infected = true;
        graph.cases_recorded = 1;
        for _ in 0..=SICKNESS_WINDOW {
            graph.get_sick_simulation();
            graph.recovery_simulation();
        }
        let c = graph.person("C").unwrap();
        assert_eq!(c.status(), DiseaseStatus::Dead);
        assert_eq!(graph.dead_count(), 1);

        for _ in 0..20 {
            graph.step().unwrap();
        }
        let c = graph.person("C").unwrap();
        assert_eq!(c.days_sick, SICKNESS_WINDOW + 1);
        assert_eq!(graph.recoveries_recorded(), 0);
    }

    #[test]
    fn reset_keeps_topology_and_probabilities() {
        let mut graph = chain(StdRandom::with_seed(5));
        for _ in 0..10 {
            graph.step().unwrap();
        }
        graph.reset();
        let snapshot = graph.statistics_snapshot();
        assert_eq!(snapshot.cases, 0);
        assert_eq!(snapshot.sick_cases, 0);
        assert_eq!(snapshot.recoveries, 0);
        assert_eq!(snapshot.healthy, 3);
        assert_eq!(snapshot.healthy_pct, 100.0);
        assert_eq!(graph.steps_run(), 0);
        assert_eq!(graph.person("A").unwrap().victims().len(), 1);
        assert!((graph.person("A").unwrap().disease_prob - 0.2).abs() < 1e-9);
    }

    #[test]
    fn mitigation_checks_first_contact_only_by_default() {
        let mut graph = ContactGraph::with_seed(3);
        graph.add_node(Person::new("young", 10, 0.8)).unwrap();
        graph.add_node(Person::new("old", 100, 0.8)).unwrap();
        graph.add_node(Person::new("kid", 5, 0.8)).unwrap();
        // kid's first contact is young, the elder comes second
        graph.add_edge("kid", "young").unwrap();
        graph.add_edge("kid", "old").unwrap();
        graph.add_edge("young", "old").unwrap();
        graph.derive_probabilities().unwrap();

        assert_eq!(graph.mitigation_policy().unwrap(), 1);
        assert!((graph.person("young").unwrap().spread_prob - 0.4).abs() < 1e-9);
        assert!((graph.person("kid").unwrap().spread_prob - 0.8).abs() < 1e-9);
        assert!((graph.person("old").unwrap().spread_prob - 0.8).abs() < 1e-9);
        assert_eq!(graph.steps_run(), 1);
        assert!(graph.cases_recorded() >= 1);
    }

    #[test]
    fn mitigation_can_check_every_contact() {
        let mut graph = ContactGraph::with_seed(3);
        graph.add_node(Person::new("young", 10, 0.8)).unwrap();
        graph.add_node(Person::new("old", 100, 0.8)).unwrap();
        graph.add_node(Person::new("kid", 5, 0.8)).unwrap();
        graph.add_edge("kid", "young").unwrap();
        graph.add_edge("kid", "old").unwrap();
        graph.add_edge("young", "old").unwrap();
        graph.derive_probabilities().unwrap();
        graph.set_mitigation_scope(MitigationScope::AllContacts);

        assert_eq!(graph.mitigation_policy().unwrap(), 2);
        assert!((graph.person("kid").unwrap().spread_prob - 0.4).abs() < 1e-9);
    }

    #[test]
    fn mitigation_resets_before_stepping() {
        let mut graph = chain(StdRandom::with_seed(11));
        for _ in 0..15 {
            graph.step().unwrap();
        }
        graph.mitigation_policy().unwrap();
        assert_eq!(graph.steps_run(), 1);
        // one seed plus at most one hop from it
        assert!(graph.cases_recorded() <= 2);
    }

    #[test]
    fn display_lists_victims() {
        let graph = chain(StdRandom::with_seed(1));
        assert_eq!(graph.to_string(), "A  |  B.\nB  |  C.\nC\n");
        let counts: Vec<_> = graph.contact_counts().collect();
        assert_eq!(counts, vec![("A", 1), ("B", 1), ("C", 0)]);
    }
}
