//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Steady-state power-flow engine and element model."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use indexmap::IndexMap;
use nalgebra::{Complex, DMatrix, DVector, Normed};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use tracing::{debug, info};

use crate::{
    errors::{EngineError, Result},
    model::{Element, ElementClass, VsourceSpec},
    sink::ElementSink,
};

/// Series impedances below this magnitude are clamped to keep the nodal
/// matrix finite.
const MIN_SERIES_IMPEDANCE_OHM: f64 = 1e-6;

/// Convergence settings for [`NodalEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub max_iterations: usize,
    /// Largest per-unit voltage update accepted as converged.
    pub tolerance: f64,
    /// Below this per-unit voltage, constant-power devices become constant impedance.
    pub vmin_pu: f64,
    /// Above this per-unit voltage, constant-power devices become constant impedance.
    pub vmax_pu: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            vmin_pu: 0.95,
            vmax_pu: 1.05,
        }
    }
}

#[derive(Debug, Clone)]
struct Solution {
    bus_names: Vec<String>,
    voltages: Vec<Complex<f64>>,
    losses: Complex<f64>,
    total_power: Complex<f64>,
}

/// Power-conversion device attached to a single bus.
#[derive(Debug, Clone, Copy)]
struct Shunt {
    node: usize,
    /// Consumed complex power in VA; negative for injections.
    power: Complex<f64>,
    nominal_v: f64,
}

/// Two-port series branch stamped as `[[y11, y12], [y12, y22]]`.
#[derive(Debug, Clone, Copy)]
struct Branch {
    from: usize,
    to: usize,
    y11: Complex<f64>,
    y22: Complex<f64>,
    y12: Complex<f64>,
}

impl Branch {
    fn series(from: usize, to: usize, y: Complex<f64>) -> Self {
        Self {
            from,
            to,
            y11: y,
            y22: y,
            y12: -y,
        }
    }

    /// Off-nominal ratio model with the leakage admittance on the `to` side.
    fn transformer(from: usize, to: usize, y: Complex<f64>, ratio: f64) -> Self {
        Self {
            from,
            to,
            y11: y / (ratio * ratio),
            y22: y,
            y12: -y / ratio,
        }
    }

    fn loss(&self, voltages: &DVector<Complex<f64>>) -> Complex<f64> {
        let v1 = voltages[self.from];
        let v2 = voltages[self.to];
        let i1 = self.y11 * v1 + self.y12 * v2;
        let i2 = self.y12 * v1 + self.y22 * v2;
        v1 * i1.conj() + v2 * i2.conj()
    }
}

/// In-process steady-state solver over a nodal admittance matrix.
///
/// Elements are modelled as single-phase equivalents. Constant-power devices
/// are handled by fixed-point current injection, reusing one LU factorisation
/// of the admittance matrix across iterations.
#[derive(Debug, Default)]
pub struct NodalEngine {
    settings: EngineSettings,
    circuit: Option<String>,
    elements: IndexMap<(ElementClass, String), Element>,
    solution: Option<Solution>,
}

impl NodalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn circuit_name(&self) -> Option<&str> {
        self.circuit.as_deref()
    }

    fn solution(&self) -> Result<&Solution> {
        self.solution.as_ref().ok_or(EngineError::NotSolved)
    }

    fn source(&self) -> Result<&VsourceSpec> {
        self.elements
            .values()
            .find_map(|element| match element {
                Element::Vsource(spec) => Some(spec),
                _ => None,
            })
            .ok_or(EngineError::MissingSource)
    }

    fn shunt_current(&self, shunt: &Shunt, voltage: Complex<f64>) -> Complex<f64> {
        let per_unit = voltage.norm() / shunt.nominal_v;
        let band_edge = if per_unit < self.settings.vmin_pu {
            Some(self.settings.vmin_pu)
        } else if per_unit > self.settings.vmax_pu {
            Some(self.settings.vmax_pu)
        } else {
            None
        };
        match band_edge {
            Some(edge) => {
                let edge_v = edge * shunt.nominal_v;
                shunt.power.conj() / (edge_v * edge_v) * voltage
            }
            None => (shunt.power / voltage).conj(),
        }
    }

    fn run(&self) -> Result<Solution> {
        let source = self.source()?;

        let mut buses: IndexMap<String, usize> = IndexMap::new();
        for element in self.elements.values() {
            for bus in element.buses() {
                if !buses.contains_key(bus) {
                    let index = buses.len();
                    buses.insert(bus.to_owned(), index);
                }
            }
        }
        let bus_count = buses.len();
        let source_bus = buses[source.bus1.as_str()];

        let mut graph = UnGraph::<usize, ()>::with_capacity(bus_count, self.elements.len());
        let nodes: Vec<NodeIndex> = (0..bus_count).map(|idx| graph.add_node(idx)).collect();
        for element in self.elements.values() {
            if let Element::Line(_) | Element::Transformer(_) = element {
                let terminals = element.buses();
                graph.add_edge(nodes[buses[terminals[0]]], nodes[buses[terminals[1]]], ());
            }
        }

        // Buses without a path to the source are left de-energised.
        let mut node_of_bus: Vec<Option<usize>> = vec![None; bus_count];
        let mut energised = 0;
        let mut bfs = Bfs::new(&graph, nodes[source_bus]);
        while let Some(node) = bfs.next(&graph) {
            node_of_bus[graph[node]] = Some(energised);
            energised += 1;
        }
        if energised < bus_count {
            debug!(
                isolated = bus_count - energised,
                "buses without a path to the source"
            );
        }

        let mut branches = Vec::new();
        let mut shunts = Vec::new();
        for element in self.elements.values() {
            let terminal = |idx: usize| node_of_bus[buses[element.buses()[idx]]];
            match element {
                Element::Vsource(_) => {}
                Element::Line(spec) => {
                    if let (Some(from), Some(to)) = (terminal(0), terminal(1)) {
                        let (r, x) = spec.impedance();
                        branches.push(Branch::series(from, to, admittance(r, x)));
                    }
                }
                Element::Transformer(spec) => {
                    if let (Some(from), Some(to)) = (terminal(0), terminal(1)) {
                        let (r, x) = spec.leakage_impedance();
                        branches.push(Branch::transformer(
                            from,
                            to,
                            admittance(r, x),
                            spec.turns_ratio(),
                        ));
                    }
                }
                Element::Load(spec) => shunts.push((
                    terminal(0),
                    Complex::new(spec.kw, spec.kvar) * 1000.0,
                    spec.kv,
                )),
                Element::Generator(spec) => shunts.push((
                    terminal(0),
                    -Complex::new(spec.kw, spec.kvar()) * 1000.0,
                    spec.kv,
                )),
                Element::PvSystem(spec) => shunts.push((
                    terminal(0),
                    -Complex::new(spec.output_kw(), 0.0) * 1000.0,
                    spec.kv,
                )),
            }
        }
        let shunts: Vec<Shunt> = shunts
            .into_iter()
            .filter_map(|(node, power, kv)| {
                let node = node?;
                (kv > 0.0).then(|| Shunt {
                    node,
                    power,
                    nominal_v: kv * 1000.0,
                })
            })
            .collect();

        let source_node = node_of_bus[source_bus].ok_or(EngineError::MissingSource)?;
        let source_y = admittance(source.r1, source.x1);
        let emf = Complex::new(source.pu * source.base_kv * 1000.0, 0.0);

        let mut y = DMatrix::<Complex<f64>>::zeros(energised, energised);
        y[(source_node, source_node)] += source_y;
        for branch in &branches {
            y[(branch.from, branch.from)] += branch.y11;
            y[(branch.to, branch.to)] += branch.y22;
            y[(branch.from, branch.to)] += branch.y12;
            y[(branch.to, branch.from)] += branch.y12;
        }

        let mut injection = DVector::<Complex<f64>>::zeros(energised);
        injection[source_node] = source_y * emf;

        let lu = y.lu();
        let solve = |rhs: &DVector<Complex<f64>>| -> Result<DVector<Complex<f64>>> {
            let solved = lu.solve(rhs).ok_or(EngineError::SingularSystem)?;
            if solved.iter().all(|v| v.re.is_finite() && v.im.is_finite()) {
                Ok(solved)
            } else {
                Err(EngineError::SingularSystem)
            }
        };

        // The no-load solution seeds the iteration and sets each bus's per-unit base.
        let no_load = solve(&injection)?;
        let bases: Vec<f64> = no_load.iter().map(|v| v.norm().max(1.0)).collect();

        let mut voltages = no_load;
        let mut converged_after = None;
        for iteration in 1..=self.settings.max_iterations {
            let mut rhs = injection.clone();
            for shunt in &shunts {
                rhs[shunt.node] -= self.shunt_current(shunt, voltages[shunt.node]);
            }
            let next = solve(&rhs)?;
            let max_delta = next
                .iter()
                .zip(voltages.iter())
                .zip(&bases)
                .map(|((new, old), base)| (new - old).norm() / base)
                .fold(0.0f64, f64::max);
            voltages = next;
            if max_delta < self.settings.tolerance {
                converged_after = Some(iteration);
                break;
            }
        }
        let iterations = converged_after.ok_or(EngineError::DidNotConverge {
            iterations: self.settings.max_iterations,
        })?;

        let losses = branches
            .iter()
            .map(|branch| branch.loss(&voltages))
            .fold(Complex::new(0.0, 0.0), |acc, loss| acc + loss);
        let source_v = voltages[source_node];
        let total_power = source_v * (source_y * (emf - source_v)).conj() / 1000.0;

        let full_voltages = node_of_bus
            .iter()
            .map(|node| match node {
                Some(idx) => voltages[*idx],
                None => Complex::new(0.0, 0.0),
            })
            .collect();

        info!(
            iterations,
            buses = bus_count,
            losses_w = losses.re,
            "power flow converged"
        );

        Ok(Solution {
            bus_names: buses.into_keys().collect(),
            voltages: full_voltages,
            losses,
            total_power,
        })
    }
}

fn admittance(r: f64, x: f64) -> Complex<f64> {
    let z = Complex::new(r, x);
    if z.norm() < MIN_SERIES_IMPEDANCE_OHM {
        Complex::new(1.0 / MIN_SERIES_IMPEDANCE_OHM, 0.0)
    } else {
        z.inv()
    }
}

impl ElementSink for NodalEngine {
    fn clear_all(&mut self) {
        self.circuit = None;
        self.elements.clear();
        self.solution = None;
    }

    fn new_circuit(&mut self, name: &str) -> Result<()> {
        self.clear_all();
        debug!(circuit = %name, "new circuit");
        self.circuit = Some(name.to_owned());
        Ok(())
    }

    fn define(&mut self, element: Element) -> Result<()> {
        if self.circuit.is_none() {
            return Err(EngineError::NoCircuit);
        }
        element.validate()?;
        self.solution = None;
        let key = (element.class(), element.name().to_owned());
        self.elements.insert(key, element);
        Ok(())
    }

    fn element(&self, class: ElementClass, name: &str) -> Option<&Element> {
        self.elements.get(&(class, name.to_owned()))
    }

    fn elements(&self) -> Vec<&Element> {
        self.elements.values().collect()
    }

    fn solve(&mut self) -> Result<()> {
        if self.circuit.is_none() {
            return Err(EngineError::NoCircuit);
        }
        self.solution = Some(self.run()?);
        Ok(())
    }

    fn bus_names(&self) -> Result<Vec<String>> {
        Ok(self.solution()?.bus_names.clone())
    }

    fn bus_vmag(&self) -> Result<Vec<f64>> {
        Ok(self.solution()?.voltages.iter().map(|v| v.norm()).collect())
    }

    fn losses(&self) -> Result<Complex<f64>> {
        Ok(self.solution()?.losses)
    }

    fn total_power(&self) -> Result<Complex<f64>> {
        Ok(self.solution()?.total_power)
    }
}
