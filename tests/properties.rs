//! Round-trip and exclusivity properties of the volume conversions
//!
//! - wire: `decode(encode(v)) == v` for generated volumes, including
//!   segments that contain the delimiter and so force the object form
//! - platform: `from_v1(to_v1(v)) == v`
//! - exclusivity: an exported platform volume populates exactly one source

use proptest::prelude::*;
use serde_json::Value;
use volume_shorthand::volume::{
    EmptyDirVolume, GcePdVolume, GlusterfsVolume, HostPathType, HostPathVolume, NfsVolume,
    PvcVolume, StorageMedium,
};
use volume_shorthand::{Volume, VolumeKind, VolumeSet};

fn text() -> impl Strategy<Value = String> {
    "[a-z0-9./:-]{0,12}"
}

fn word() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

fn volume() -> impl Strategy<Value = Volume> {
    prop_oneof![
        (text(), prop::sample::select(HostPathType::ALL.to_vec()))
            .prop_map(|(path, path_type)| Volume::HostPath(HostPathVolume { path, path_type })),
        (
            prop::option::of(prop::sample::select(StorageMedium::ALL.to_vec())),
            prop::option::of("[1-9][0-9]{0,3}(Mi|Gi)"),
        )
            .prop_map(|(medium, max_size)| Volume::EmptyDir(EmptyDirVolume { medium, max_size })),
        (text(), prop::option::of(word()), prop::option::of(0i32..16), any::<bool>()).prop_map(
            |(pd_name, fs_type, partition, read_only)| {
                Volume::GcePd(GcePdVolume {
                    pd_name,
                    fs_type,
                    partition,
                    read_only,
                })
            }
        ),
        (text(), text(), any::<bool>())
            .prop_map(|(server, path, read_only)| Volume::Nfs(NfsVolume { server, path, read_only })),
        (text(), text(), any::<bool>()).prop_map(|(endpoints, path, read_only)| {
            Volume::Glusterfs(GlusterfsVolume {
                endpoints,
                path,
                read_only,
            })
        }),
        (text(), any::<bool>()).prop_map(|(claim, read_only)| Volume::Pvc(PvcVolume { claim, read_only })),
    ]
}

fn populated_sources(volume: &Volume) -> Vec<String> {
    let platform = serde_json::to_value(volume.to_v1("probe").unwrap()).unwrap();
    let Value::Object(map) = platform else {
        panic!("platform volume is not an object");
    };
    map.into_iter()
        .map(|(key, _)| key)
        .filter(|key| key != "name")
        .collect()
}

proptest! {
    #[test]
    fn prop_wire_round_trip(volume in volume()) {
        let encoded = volume.to_wire().unwrap();
        prop_assert_eq!(Volume::from_wire(&encoded).unwrap(), volume);
    }

    #[test]
    fn prop_string_form_has_no_named_fields(volume in volume()) {
        let encoded = volume.to_wire().unwrap();
        if let Value::String(raw) = &encoded {
            let discriminator = raw.split(':').next().unwrap();
            prop_assert_eq!(discriminator, volume.kind().discriminator());
        } else {
            prop_assert_eq!(&encoded["vol_type"], &Value::from(volume.kind().discriminator()));
        }
    }

    #[test]
    fn prop_platform_round_trip(volume in volume()) {
        let platform = volume.to_v1("data").unwrap();
        prop_assert_eq!(&platform.name, "data");
        prop_assert_eq!(Volume::from_v1(&platform).unwrap(), volume);
    }

    #[test]
    fn prop_export_populates_one_source(volume in volume()) {
        prop_assert_eq!(populated_sources(&volume).len(), 1);
    }

    #[test]
    fn prop_volume_set_round_trip(volumes in prop::collection::btree_map(word(), volume(), 0..6)) {
        let set: VolumeSet = volumes.into_iter().collect();
        let encoded = set.encode().unwrap();
        prop_assert_eq!(&VolumeSet::decode(&encoded).unwrap(), &set);
        prop_assert_eq!(VolumeSet::from_v1(&set.to_v1().unwrap()).unwrap(), set);
    }
}

#[test]
fn test_every_kind_exports_one_source() {
    for kind in VolumeKind::ALL {
        let mut object = serde_json::Map::new();
        object.insert("vol_type".into(), Value::from(kind.discriminator()));
        let volume = Volume::from_object_form(object).unwrap();

        let sources = populated_sources(&volume);
        assert_eq!(sources.len(), 1, "{} populated {:?}", kind, sources);
        assert_eq!(Volume::from_v1(&volume.to_v1("probe").unwrap()).unwrap(), volume, "{}", kind);
    }
}
