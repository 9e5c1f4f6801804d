use anyhow::Result;
use sampler::{LayerLabel, Record};
use serde::{ser::SerializeMap, Serialize, Serializer};

/// One record, with a key per layer in layer order. Samples are
/// written the way the table writes them.
struct JsonEntry<'a>(&'a Record);

impl Serialize for JsonEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.0;
        let mut map = serializer.serialize_map(Some(2 + LayerLabel::COUNT))?;
        map.serialize_entry("id", &record.site.id)?;
        map.serialize_entry("location", &[record.site.lon(), record.site.lat()])?;
        for (label, sample) in record.iter() {
            map.serialize_entry(label.as_str(), &sample.to_string())?;
        }
        map.end()
    }
}

pub fn gen_json(records: &[Record]) -> Result<String> {
    let entries: Vec<JsonEntry> = records.iter().map(JsonEntry).collect();
    Ok(serde_json::to_string(&entries)?)
}

pub fn print_json(records: &[Record]) -> Result<()> {
    println!("{}", gen_json(records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::gen_json;
    use sampler::{Record, Sample, Site};

    fn record() -> Record {
        Record {
            site: Site::new(Some("7".into()), 35.1, -1.73),
            samples: [
                Sample::Value(1180.0),
                Sample::Value(1e-10),
                Sample::NoData,
                Sample::Value(612.5),
            ],
        }
    }

    #[test]
    fn test_keys_in_layer_order() {
        let json = gen_json(&[record()]).unwrap();
        assert_eq!(
            json,
            r#"[{"id":"7","location":[35.1,-1.73],"elevation":"1180","slope":"0.0000000001","ndvi_mean":"No data","precip_mean":"612.5"}]"#
        );
    }

    #[test]
    fn test_site_without_id() {
        let mut record = record();
        record.site.id = None;
        let json = gen_json(&[record]).unwrap();
        assert!(json.starts_with(r#"[{"id":null,"#));
    }
}
