use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use candle_core::Tensor;
use serde_json::{json, Map, Value};

use super::encoder::FEATURE_LEN;
use super::model::SongoNet;
use crate::errors::{SongoError, SongoResult};
use crate::state::TOTAL_PITS;

/// Writes the browser-readable weight document: architecture metadata plus
/// every parameter as nested JSON arrays under its PyTorch-style name. The
/// safetensors checkpoint is the companion tensor-format artifact.
pub fn export_to_json(net: &SongoNet, path: &Path) -> SongoResult<()> {
    let mut weights = Map::new();
    {
        let data = net.varmap.data().lock().expect("varmap lock");
        let mut names: Vec<String> = data.keys().cloned().collect();
        names.sort();
        for name in names {
            let value = tensor_to_json(data[&name].as_tensor())?;
            weights.insert(name, value);
        }
    }

    let doc = json!({
        "architecture": net.size().architecture(),
        "input_size": FEATURE_LEN,
        "output_size": TOTAL_PITS,
        "hidden_size": net.hidden_size(),
        "weights": Value::Object(weights),
    });

    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(file, &doc)?;
    Ok(())
}

fn tensor_to_json(tensor: &Tensor) -> SongoResult<Value> {
    match tensor.dims() {
        [_] => Ok(json!(tensor.to_vec1::<f32>()?)),
        [_, _] => Ok(json!(tensor.to_vec2::<f32>()?)),
        dims => Err(SongoError::Persistence(format!(
            "cannot export tensor of rank {}",
            dims.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::nn::loader::device;
    use crate::players::nn::model::NetworkSize;

    #[test]
    fn test_export_document_shape() {
        let net = SongoNet::new(NetworkSize::Small, 8, device()).unwrap();
        let path = std::env::temp_dir().join("songo_export_test.json");

        export_to_json(&net, &path).unwrap();

        let doc: Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(doc["architecture"], "SongoNetSmall");
        assert_eq!(doc["input_size"], 17);
        assert_eq!(doc["output_size"], 14);
        assert_eq!(doc["hidden_size"], 8);
        let weights = doc["weights"].as_object().unwrap();
        assert!(weights.contains_key("fc1.weight"));
        assert!(weights.contains_key("policy_fc.bias"));
        // fc1.weight is [hidden, input] as nested rows.
        assert_eq!(weights["fc1.weight"].as_array().unwrap().len(), 8);
    }
}
