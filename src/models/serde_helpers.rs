//! Serde serialization helpers for ensuring consistent JSON output

use super::ink::ChannelMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Serialize a channel map as a JSON object whose keys keep trace format order
impl<V: Serialize> Serialize for ChannelMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, values) in self.iter() {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_map_keeps_insertion_order() {
        let mut map: ChannelMap<Vec<f64>> = ChannelMap::new();
        map.insert("Y", vec![2.0]);
        map.insert("X", vec![1.0]);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Y":[2.0],"X":[1.0]}"#);
    }
}
