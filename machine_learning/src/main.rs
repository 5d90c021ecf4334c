use std::{env, fs};

use anyhow::Context;
use log::info;
use machine_learning::arch::ModelBuilder;
use ndarray::array;

const XOR_SPEC: &str = r#"{
    "layers": [{ "linear": { "dim": [2, 4] } }, { "linear": { "dim": [4, 1] } }],
    "activations": ["tanh", "sigmoid"],
    "loss": "mse",
    "init": "xavier_uniform",
    "seed": 42
}"#;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let spec = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => XOR_SPEC.to_string(),
    };

    let mut model = ModelBuilder::new()
        .from_json(&spec)
        .context("building the model")?;

    let x = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
    let y = array![[0.], [1.], [1.], [0.]];

    let pass = model.forward(x.view())?;
    let loss = model.evaluate(&pass, y.view())?;
    let dx = model.backward(pass)?;
    info!(loss = loss; "xor batch evaluated");
    info!("input gradient: {dx:?}");

    for (i, layer) in model.layers().iter().enumerate() {
        let Some((dw, db)) = layer.grads() else {
            continue;
        };

        let dw_norm = dw.mapv(|g| g * g).sum().sqrt();
        let db_norm = db.mapv(|g| g * g).sum().sqrt();
        info!(layer = i, dw_norm = dw_norm, db_norm = db_norm; "layer gradients");
    }

    Ok(())
}
