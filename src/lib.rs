#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{ControlledSurface, Point3, ReconcileDiagnostics, Spline, SurfaceOptions, Vec3};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Bewerkbaar splineoppervlak voor JavaScript-hosts.
#[wasm_bindgen]
pub struct SurfaceEngine {
    surface: ControlledSurface,
    last_diagnostics: Option<ReconcileDiagnostics>,
}

#[wasm_bindgen]
impl SurfaceEngine {
    /// Bouw een oppervlak uit losse parameters en reconcilieer het direct.
    #[wasm_bindgen(constructor)]
    pub fn new(
        size_x: f64,
        size_y: f64,
        control_points_x: usize,
        control_points_y: usize,
        interpolation: usize,
    ) -> Result<SurfaceEngine, JsValue> {
        let options = SurfaceOptions::default()
            .with_size(size_x, size_y)
            .with_control_points(control_points_x, control_points_y)
            .with_interpolation(interpolation);
        Self::with_options(options)
    }

    /// Bouw een oppervlak uit een options-object; ontbrekende velden krijgen standaardwaarden.
    #[wasm_bindgen]
    pub fn from_options(options: JsValue) -> Result<SurfaceEngine, JsValue> {
        let options: SurfaceOptions = if options.is_undefined() || options.is_null() {
            SurfaceOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|err| JsError::new(&err.to_string()))?
        };
        Self::with_options(options)
    }

    #[wasm_bindgen]
    pub fn control_point_count(&self) -> usize {
        self.surface.control_point_count()
    }

    /// Grid-index van controlepunt `control`.
    #[wasm_bindgen]
    pub fn control_index(&self, control: usize) -> Result<usize, JsValue> {
        self.surface.control_index(control).map_err(to_js_error)
    }

    /// Positie van controlepunt `control` als `[x, y, z]`.
    #[wasm_bindgen]
    pub fn control_point(&self, control: usize) -> Result<Vec<f64>, JsValue> {
        let point = self.surface.control_point(control).map_err(to_js_error)?;
        Ok(point.to_array().to_vec())
    }

    /// Alle controlepunten als lijst van `[x, y, z]`.
    #[wasm_bindgen]
    pub fn control_points(&self) -> Result<JsValue, JsValue> {
        let points: Vec<[f64; 3]> = self
            .surface
            .control_points()
            .iter()
            .map(|p| p.to_array())
            .collect();
        serde_wasm_bindgen::to_value(&points).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Alle controlepunten als platte `[x0, y0, z0, x1, ...]` buffer.
    #[wasm_bindgen]
    pub fn control_points_flat(&self) -> Vec<f64> {
        self.surface
            .control_points()
            .iter()
            .flat_map(|p| p.to_array())
            .collect()
    }

    /// Verplaats een controlepunt; het oppervlak volgt pas na `reconcile`.
    #[wasm_bindgen]
    pub fn move_control_point(&mut self, control: usize, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.surface
            .move_control_point(control, Point3::new(x, y, z))
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn move_control_point_x(&mut self, control: usize, x: f64) -> Result<(), JsValue> {
        self.surface.move_control_point_x(control, x).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn move_control_point_y(&mut self, control: usize, y: f64) -> Result<(), JsValue> {
        self.surface.move_control_point_y(control, y).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn move_control_point_z(&mut self, control: usize, z: f64) -> Result<(), JsValue> {
        self.surface.move_control_point_z(control, z).map_err(to_js_error)
    }

    /// Sleep een controlepunt verticaal en reconcilieer meteen (per frame tijdens slepen).
    #[wasm_bindgen]
    pub fn drag_control_point_z(&mut self, control: usize, z: f64) -> Result<(), JsValue> {
        self.move_control_point_z(control, z)?;
        self.reconcile()
    }

    /// Herbereken alle afgeleide vertices uit de controlepunten.
    #[wasm_bindgen]
    pub fn reconcile(&mut self) -> Result<(), JsValue> {
        match self.surface.reconcile() {
            Ok(diagnostics) => {
                debug_log!("oppervlak gereconcilieerd: {diagnostics}");
                self.last_diagnostics = Some(diagnostics);
                Ok(())
            }
            Err(err) => {
                self.last_diagnostics = None;
                Err(to_js_error(err))
            }
        }
    }

    /// Geeft terug of controlepunten gewijzigd zijn sinds de laatste geslaagde reconcile.
    #[wasm_bindgen]
    pub fn is_stale(&self) -> bool {
        self.surface.is_stale()
    }

    /// Vertexposities als platte `[x0, y0, z0, x1, ...]` buffer.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f64> {
        self.surface.positions_flat().to_vec()
    }

    /// Driehoeksindices, drie per driehoek.
    #[wasm_bindgen]
    pub fn indices(&self) -> Vec<u32> {
        self.surface.indices().to_vec()
    }

    #[wasm_bindgen]
    pub fn vertex_count(&self) -> usize {
        self.surface.grid().vertex_count()
    }

    #[wasm_bindgen]
    pub fn triangle_count(&self) -> usize {
        self.surface.grid().triangle_count()
    }

    /// Diagnostiek van de laatste geslaagde reconcile, of `null`.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        match self.last_diagnostics.as_ref() {
            Some(diagnostics) => serde_wasm_bindgen::to_value(diagnostics)
                .map_err(|err| JsError::new(&err.to_string()).into()),
            None => Ok(JsValue::NULL),
        }
    }
}

impl SurfaceEngine {
    fn with_options(options: SurfaceOptions) -> Result<SurfaceEngine, JsValue> {
        let mut surface = ControlledSurface::build(options).map_err(to_js_error)?;
        let diagnostics = surface.reconcile().map_err(to_js_error)?;
        debug_log!(
            "oppervlak aangemaakt: {} controlepunten, {} vertices",
            surface.control_point_count(),
            surface.grid().vertex_count()
        );
        Ok(SurfaceEngine {
            surface,
            last_diagnostics: Some(diagnostics),
        })
    }

    /// Rust-side access to the underlying surface.
    #[must_use]
    pub fn surface(&self) -> &ControlledSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_diagnostics(&self) -> Option<&ReconcileDiagnostics> {
        self.last_diagnostics.as_ref()
    }
}

/// Sample een spline door platte `[x0, y0, z0, ...]` punten; resultaat is eveneens plat.
#[wasm_bindgen]
pub fn spline_line(points: &[f64], interpolation: usize) -> Result<Vec<f64>, JsValue> {
    let spline = build_spline(points, interpolation)?;
    Ok(spline.spline_line().iter().flat_map(|p| p.to_array()).collect())
}

/// Extrudeer een spline langs `(dx, dy, dz)` tot een lint; resultaat is `{ positions, indices }`.
#[wasm_bindgen]
pub fn extrude_spline(
    points: &[f64],
    interpolation: usize,
    dx: f64,
    dy: f64,
    dz: f64,
) -> Result<JsValue, JsValue> {
    let mesh = extrude_spline_mesh(points, interpolation, Vec3::new(dx, dy, dz))?;
    let export = MeshExport {
        positions: mesh.positions_flat(),
        indices: &mesh.indices,
    };
    serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
}

#[derive(Debug, serde::Serialize)]
struct MeshExport<'a> {
    positions: &'a [f64],
    indices: &'a [u32],
}

fn extrude_spline_mesh(
    points: &[f64],
    interpolation: usize,
    direction: Vec3,
) -> Result<geom::GeomMesh, JsValue> {
    let spline = build_spline(points, interpolation)?;
    spline.extrude(direction).map_err(to_js_error)
}

fn build_spline(points: &[f64], interpolation: usize) -> Result<Spline, JsValue> {
    let points = points_from_flat(points)?;
    Spline::new(&points, interpolation).map_err(to_js_error)
}

fn points_from_flat(flat: &[f64]) -> Result<Vec<Point3>, JsValue> {
    if flat.len() % 3 != 0 {
        return Err(js_error("puntenbuffer moet een veelvoud van 3 waarden bevatten"));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        log::debug!("{message}");
        JsValue::NULL
    }
}
