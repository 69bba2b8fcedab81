//! Built-in request fixtures for the viewer's JSON-RPC plugin

use crate::{
    models::{OpenParams, RpcRequest, Transformation},
    Error, Result,
};
use std::fmt;
use std::str::FromStr;

pub const FIXTURE_FILENAME: &str = "/tmp/teapot.ply";
pub const FIXTURE_FILTER: &str = "PLY mesh (*.ply)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// Remove everything from the scene
    Clear,
    /// Load a file with the plugin's defaults
    Open,
    /// Load a file silently with an explicit filter and placement matrix
    OpenMatrix,
}

impl Fixture {
    pub const ALL: [Fixture; 3] = [Fixture::Clear, Fixture::Open, Fixture::OpenMatrix];

    pub fn name(self) -> &'static str {
        match self {
            Fixture::Clear => "clear",
            Fixture::Open => "open",
            Fixture::OpenMatrix => "open-matrix",
        }
    }

    pub fn request(self) -> Result<RpcRequest> {
        match self {
            Fixture::Clear => Ok(RpcRequest::clear(5)),
            Fixture::Open => RpcRequest::open(&OpenParams::new(FIXTURE_FILENAME), 4),
            Fixture::OpenMatrix => {
                let params = OpenParams::new(FIXTURE_FILENAME)
                    .with_filter(FIXTURE_FILTER)
                    .with_silent(true)
                    .with_transformation(teapot_placement());
                RpcRequest::open(&params, 4)
            }
        }
    }

    pub fn payload(self) -> Result<String> {
        self.request()?.to_payload()
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fixture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Fixture::ALL
            .into_iter()
            .find(|fixture| fixture.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Fixture::ALL.iter().map(|f| f.name()).collect();
                Error::Validation(format!(
                    "Unknown fixture '{}'. Must be one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Rigid registration result used by the matrix fixture
fn teapot_placement() -> Transformation {
    Transformation::from_rows([
        [
            -0.5732937009507673,
            0.8193193174792813,
            0.007084582014166903,
            -161.35002666963268,
        ],
        [
            -0.8193308300123949,
            -0.5733179603522832,
            0.001873784980341508,
            320.67951255557966,
        ],
        [
            0.005596946702519333,
            -0.004730387192182964,
            0.9999731500865392,
            -230.60935194531334,
        ],
        [0.0, 0.0, 0.0, 1.0],
    ])
}
