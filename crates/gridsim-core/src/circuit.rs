//! ---
//! ems_section: "09-integration-interoperability"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Circuit synthesis, validation, and result translation."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! The circuit facade: the add/solve/query/clear lifecycle over one engine.
//!
//! Every batch call synthesizes and validates all of its elements before the
//! first one is defined, so a failing call leaves the engine and the
//! identifier counters exactly as they were.
use std::collections::HashMap;
use std::path::Path;

use gridsim_common::GridSimConfig;
use gridsim_engine::{Element, ElementClass, ElementSink, EngineSettings, NodalEngine};
use indexmap::IndexMap;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::{
    components::{generator, line, load, pv, source, transformer, Endpoint, LineLink, Terminal},
    errors::{GridSimError, Result},
    naming::{ComponentKind, Identifier, NameRegistry},
    params::ParameterOverrides,
    presets::{GeneratorType, LineType, LoadType, SourceType},
    results::{self, SimulationResults},
};

pub const DEFAULT_CIRCUIT_NAME: &str = "gridsim";

fn element_class(kind: ComponentKind) -> ElementClass {
    match kind {
        ComponentKind::Load => ElementClass::Load,
        ComponentKind::Source => ElementClass::Vsource,
        ComponentKind::Line => ElementClass::Line,
        ComponentKind::Transformer => ElementClass::Transformer,
        ComponentKind::Generator => ElementClass::Generator,
        ComponentKind::Pv => ElementClass::PvSystem,
    }
}

fn endpoint_of(element: &Element) -> Option<Endpoint> {
    match element {
        Element::Vsource(spec) => Some(Endpoint::new(ComponentKind::Source, spec.base_kv)),
        Element::Load(spec) => Some(Endpoint::new(ComponentKind::Load, spec.kv)),
        Element::Generator(spec) => Some(Endpoint::new(ComponentKind::Generator, spec.kv)),
        _ => None,
    }
}

/// A distribution circuit under construction.
///
/// Owns its engine; there is no way to share one engine between circuits.
pub struct Circuit<E: ElementSink = NodalEngine> {
    engine: E,
    registry: NameRegistry,
    rng: StdRng,
    endpoints: IndexMap<String, Endpoint>,
    nicknames: HashMap<String, String>,
    name: String,
}

impl Circuit<NodalEngine> {
    /// Circuit over the built-in engine with default settings and an
    /// entropy-seeded random source.
    pub fn new() -> Result<Self> {
        Self::with_config(&GridSimConfig::default())
    }

    pub fn with_config(config: &GridSimConfig) -> Result<Self> {
        let solver = &config.solver;
        let engine = NodalEngine::with_settings(EngineSettings {
            max_iterations: solver.max_iterations,
            tolerance: solver.tolerance,
            vmin_pu: solver.vmin_pu,
            vmax_pu: solver.vmax_pu,
        });
        Self::open(
            engine,
            config.simulation.random_seed,
            &config.simulation.circuit_name,
        )
    }
}

impl<E: ElementSink> Circuit<E> {
    /// Takes ownership of `engine`, wiping whatever circuit it held.
    pub fn with_engine(engine: E, seed: Option<u64>) -> Result<Self> {
        Self::open(engine, seed, DEFAULT_CIRCUIT_NAME)
    }

    fn open(mut engine: E, seed: Option<u64>, name: &str) -> Result<Self> {
        engine.clear_all();
        engine.new_circuit(name)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(circuit = name, seed = ?seed, "opened circuit");
        Ok(Self {
            engine,
            registry: NameRegistry::new(),
            rng,
            endpoints: IndexMap::new(),
            nicknames: HashMap::new(),
            name: name.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Endpoint registered under `id`, if any.
    pub fn endpoint(&self, id: &str) -> Option<Endpoint> {
        self.endpoints.get(id).copied()
    }

    fn terminal<'a>(&self, id: &'a str) -> Result<Terminal<'a>> {
        let endpoint = self
            .endpoint(id)
            .ok_or_else(|| GridSimError::UnknownEndpoint(id.to_owned()))?;
        Ok(Terminal { bus: id, endpoint })
    }

    /// Validates every element, defines them in order and adopts `registry`
    /// once the sink has accepted all of them.
    fn commit(&mut self, registry: NameRegistry, elements: Vec<Element>) -> Result<()> {
        for element in &elements {
            element.validate()?;
        }
        for element in elements {
            let endpoint =
                endpoint_of(&element).map(|endpoint| (element.name().to_owned(), endpoint));
            debug!(class = %element.class(), name = element.name(), "defining element");
            self.engine.define(element)?;
            if let Some((name, endpoint)) = endpoint {
                self.endpoints.insert(name, endpoint);
            }
        }
        self.registry = registry;
        Ok(())
    }

    pub fn add_load_nodes(
        &mut self,
        load_type: LoadType,
        overrides: &ParameterOverrides,
        count: usize,
    ) -> Result<Vec<Identifier>> {
        let mut staged = self.registry.clone();
        let mut ids = Vec::with_capacity(count);
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let id = staged.next(ComponentKind::Load);
            elements.push(load::synthesize(&id, load_type, overrides, &mut self.rng)?);
            ids.push(id);
        }
        self.commit(staged, elements)?;
        info!(load_type = %load_type, count, "added loads");
        Ok(ids)
    }

    /// Creates the source or overwrites the existing one.
    pub fn update_source(
        &mut self,
        source_type: SourceType,
        overrides: &ParameterOverrides,
    ) -> Result<Identifier> {
        let element = source::synthesize(source_type, overrides, &mut self.rng)?;
        let registry = self.registry.clone();
        self.commit(registry, vec![element])?;
        info!(source_type = %source_type, "updated source");
        Ok(Identifier::source())
    }

    /// Connects each `(from, to)` pair with a line, optionally paired with a
    /// transformer. Repeated pairs create repeated lines.
    pub fn add_lines<A, B>(
        &mut self,
        connections: &[(A, B)],
        line_type: LineType,
        overrides: &ParameterOverrides,
        with_transformer: bool,
    ) -> Result<Vec<LineLink>>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut staged = self.registry.clone();
        let mut links = Vec::with_capacity(connections.len());
        let mut elements = Vec::new();
        for (from, to) in connections {
            let from = self.terminal(from.as_ref())?;
            let to = self.terminal(to.as_ref())?;
            let seq = if with_transformer {
                staged.next_shared(&[ComponentKind::Line, ComponentKind::Transformer])
            } else {
                staged.next(ComponentKind::Line).seq().unwrap_or_default()
            };
            let (link, mut created) = line::synthesize(
                seq,
                from,
                to,
                line_type,
                overrides,
                with_transformer,
                &mut self.rng,
            )?;
            elements.append(&mut created);
            links.push(link);
        }
        self.commit(staged, elements)?;
        info!(line_type = %line_type, count = links.len(), with_transformer, "added lines");
        Ok(links)
    }

    pub fn add_transformers<A, B>(
        &mut self,
        connections: &[(A, B)],
        overrides: &ParameterOverrides,
    ) -> Result<Vec<Identifier>>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut staged = self.registry.clone();
        let mut ids = Vec::with_capacity(connections.len());
        let mut elements = Vec::with_capacity(connections.len());
        for (from, to) in connections {
            let from = self.terminal(from.as_ref())?;
            let to = self.terminal(to.as_ref())?;
            let id = staged.next(ComponentKind::Transformer);
            elements.push(transformer::synthesize(&id, from, to, overrides, &mut self.rng)?);
            ids.push(id);
        }
        self.commit(staged, elements)?;
        info!(count = ids.len(), "added transformers");
        Ok(ids)
    }

    pub fn add_generators(
        &mut self,
        count: usize,
        gen_type: GeneratorType,
        overrides: &ParameterOverrides,
    ) -> Result<Vec<Identifier>> {
        let mut staged = self.registry.clone();
        let mut ids = Vec::with_capacity(count);
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let id = staged.next(ComponentKind::Generator);
            elements.push(generator::synthesize(&id, gen_type, overrides, &mut self.rng)?);
            ids.push(id);
        }
        self.commit(staged, elements)?;
        info!(gen_type = %gen_type, count, "added generators");
        Ok(ids)
    }

    /// Attaches a PV system of `num_panels` panels to each listed load.
    pub fn add_pv_systems<S: AsRef<str>>(
        &mut self,
        load_ids: &[S],
        overrides: &ParameterOverrides,
        num_panels: u32,
    ) -> Result<Vec<Identifier>> {
        if load_ids.is_empty() {
            return Err(GridSimError::EmptyTargetList);
        }
        let mut staged = self.registry.clone();
        let mut ids = Vec::with_capacity(load_ids.len());
        let mut elements = Vec::with_capacity(load_ids.len());
        for target in load_ids {
            let target = target.as_ref();
            match self.endpoint(target) {
                Some(Endpoint {
                    kind: ComponentKind::Load,
                    ..
                }) => {}
                _ => return Err(GridSimError::UnknownEndpoint(target.to_owned())),
            }
            let id = staged.next(ComponentKind::Pv);
            elements.push(pv::synthesize(&id, target, overrides, num_panels, &mut self.rng)?);
            ids.push(id);
        }
        self.commit(staged, elements)?;
        info!(count = ids.len(), num_panels, "added PV systems");
        Ok(ids)
    }

    pub fn solve(&mut self) -> Result<()> {
        info!(circuit = %self.name, elements = self.engine.elements().len(), "solving circuit");
        self.engine.solve()?;
        Ok(())
    }

    /// Answers each query by name; unknown names map to `"Invalid"`.
    ///
    /// Results are exported as JSON when `export_path` is set and non-empty.
    pub fn results<S: AsRef<str>>(
        &self,
        queries: &[S],
        export_path: Option<&Path>,
    ) -> Result<SimulationResults> {
        let mut output = SimulationResults::new();
        for query in queries {
            let query = query.as_ref();
            output.insert(query, results::query(&self.engine, query, &self.nicknames)?);
        }
        if let Some(path) = export_path {
            output.export(path)?;
        }
        Ok(output)
    }

    /// Wipes the engine's circuit and every counter, endpoint and nickname.
    pub fn clear(&mut self) -> Result<()> {
        self.engine.clear_all();
        self.engine.new_circuit(&self.name)?;
        self.registry.reset_all();
        self.endpoints.clear();
        self.nicknames.clear();
        info!(circuit = %self.name, "cleared circuit");
        Ok(())
    }

    /// Labels a bus in voltage results as `"{id} ({nickname})"`.
    pub fn set_nickname(&mut self, id: &str, nickname: impl Into<String>) -> Result<()> {
        if !self.endpoints.contains_key(id) {
            return Err(GridSimError::UnknownEndpoint(id.to_owned()));
        }
        self.nicknames.insert(id.to_owned(), nickname.into());
        Ok(())
    }

    /// Declared elements of one kind, in creation order.
    pub fn view(&self, kind: ComponentKind) -> Vec<&Element> {
        let class = element_class(kind);
        self.engine
            .elements()
            .into_iter()
            .filter(|element| element.class() == class)
            .collect()
    }
}
