//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Steady-state power-flow engine and element model."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use nalgebra::Complex;

use crate::{
    errors::Result,
    model::{Element, ElementClass},
};

/// A power-flow engine that accepts element declarations and answers
/// post-solve queries.
///
/// Implementations hold exactly one circuit at a time. Declaring an element
/// whose class and name already exist overwrites it.
pub trait ElementSink {
    /// Drops the active circuit and every element in it.
    fn clear_all(&mut self);

    /// Opens a fresh, empty circuit.
    fn new_circuit(&mut self, name: &str) -> Result<()>;

    /// Creates or overwrites an element.
    fn define(&mut self, element: Element) -> Result<()>;

    fn element(&self, class: ElementClass, name: &str) -> Option<&Element>;

    /// All declared elements in declaration order.
    fn elements(&self) -> Vec<&Element>;

    /// Runs a steady-state solve of the active circuit.
    fn solve(&mut self) -> Result<()>;

    /// Bus names in the order used by [`ElementSink::bus_vmag`].
    fn bus_names(&self) -> Result<Vec<String>>;

    /// Voltage magnitude of each bus, in volts.
    fn bus_vmag(&self) -> Result<Vec<f64>>;

    /// Total series losses in W + j var.
    fn losses(&self) -> Result<Complex<f64>>;

    /// Power delivered by the source in kW + j kvar.
    fn total_power(&self) -> Result<Complex<f64>>;
}
