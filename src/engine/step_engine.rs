use super::step::{StepEntity, StepFile, StepValue};
use super::{IfcEngine, ModelHandle};
use crate::error::EngineError;
use crate::model::SpatialNode;
use crate::schema::{TypeCode, TypeSchema};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

// Tags used on value holders, matching the engine's JSON layout.
const STRING_TAG: u64 = 1;
const ENUM_TAG: u64 = 3;
const REAL_TAG: u64 = 4;
const REFERENCE_TAG: u64 = 5;
const INTEGER_TAG: u64 = 10;

/// Reference-resolution depth for property, material and type queries.
const RESOLVE_DEPTH: usize = 4;

/// Fields whose references are never resolved (geometry and bookkeeping).
const KEEP_AS_REFERENCE: &[&str] = &[
    "OwnerHistory",
    "ObjectPlacement",
    "Representation",
    "RepresentationMaps",
    "Profile",
    "EnumerationReference",
    "CompositeProfile",
];

const ROOT_ATTRIBUTES: &[&str] = &["GlobalId", "OwnerHistory", "Name", "Description"];

const OBJECT_ATTRIBUTES: &[&str] = &[
    "GlobalId",
    "OwnerHistory",
    "Name",
    "Description",
    "ObjectType",
    "ObjectPlacement",
    "Representation",
    "Tag",
];

const TYPE_ATTRIBUTES: &[&str] = &[
    "GlobalId",
    "OwnerHistory",
    "Name",
    "Description",
    "ApplicableOccurrence",
    "HasPropertySets",
    "RepresentationMaps",
    "Tag",
    "ElementType",
    "PredefinedType",
];

fn attribute_names(entity: &StepEntity) -> &'static [&'static str] {
    match entity.entity_type.as_str() {
        "IFCPROPERTYSET" => &["GlobalId", "OwnerHistory", "Name", "Description", "HasProperties"],
        "IFCELEMENTQUANTITY" => &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "MethodOfMeasurement",
            "Quantities",
        ],
        "IFCPROPERTYSINGLEVALUE" => &["Name", "Description", "NominalValue", "Unit"],
        "IFCPROPERTYENUMERATEDVALUE" => {
            &["Name", "Description", "EnumerationValues", "EnumerationReference"]
        }
        "IFCPROPERTYLISTVALUE" => &["Name", "Description", "ListValues", "Unit"],
        "IFCQUANTITYLENGTH" => &["Name", "Description", "Unit", "LengthValue", "Formula"],
        "IFCQUANTITYAREA" => &["Name", "Description", "Unit", "AreaValue", "Formula"],
        "IFCQUANTITYVOLUME" => &["Name", "Description", "Unit", "VolumeValue", "Formula"],
        "IFCQUANTITYCOUNT" => &["Name", "Description", "Unit", "CountValue", "Formula"],
        "IFCQUANTITYWEIGHT" => &["Name", "Description", "Unit", "WeightValue", "Formula"],
        "IFCSIUNIT" => &["Dimensions", "UnitType", "Prefix", "Name"],
        "IFCCONVERSIONBASEDUNIT" => &["Dimensions", "UnitType", "Name", "ConversionFactor"],
        "IFCMATERIAL" => &["Name", "Description", "Category"],
        "IFCMATERIALLIST" => &["Materials"],
        "IFCMATERIALLAYER" => &[
            "Material",
            "LayerThickness",
            "IsVentilated",
            "Name",
            "Description",
            "Category",
            "Priority",
        ],
        "IFCMATERIALLAYERSET" => &["MaterialLayers", "LayerSetName", "Description"],
        "IFCMATERIALLAYERSETUSAGE" => &[
            "ForLayerSet",
            "LayerSetDirection",
            "DirectionSense",
            "OffsetFromReferenceLine",
            "ReferenceExtent",
        ],
        "IFCMATERIALPROFILE" => &[
            "Name",
            "Description",
            "Material",
            "Profile",
            "Priority",
            "Category",
        ],
        "IFCMATERIALPROFILESET" => {
            &["Name", "Description", "MaterialProfiles", "CompositeProfile"]
        }
        "IFCMATERIALPROFILESETUSAGE" => &["ForProfileSet", "CardinalPoint", "ReferenceExtent"],
        "IFCMATERIALCONSTITUENT" => &["Name", "Description", "Material", "Fraction", "Category"],
        "IFCMATERIALCONSTITUENTSET" => &["Name", "Description", "MaterialConstituents"],
        name if name.ends_with("TYPE") || name.ends_with("STYLE") => TYPE_ATTRIBUTES,
        name if name.starts_with("IFCREL") => ROOT_ATTRIBUTES,
        _ if matches!(entity.values.first(), Some(StepValue::String(_))) => OBJECT_ATTRIBUTES,
        _ => &[],
    }
}

/// Relationship indices built once per opened file.
#[derive(Debug, Default)]
struct Relations {
    // relating object → related objects, in file order
    aggregates: HashMap<u32, Vec<u32>>,
    contained: HashMap<u32, Vec<u32>>,
    property_sets: HashMap<u32, Vec<u32>>,
    materials: HashMap<u32, Vec<u32>>,
    types: HashMap<u32, Vec<u32>>,
}

impl Relations {
    fn build(file: &StepFile) -> Self {
        let mut relations = Relations::default();

        // IfcRelAggregates: 4 = RelatingObject, 5 = RelatedObjects
        for rel in file.get_entities_by_type("IFCRELAGGREGATES") {
            if let Some(parent) = rel.get(4).and_then(StepValue::as_reference) {
                let children = rel.get(5).map(StepValue::references).unwrap_or_default();
                relations.aggregates.entry(parent).or_default().extend(children);
            }
        }

        // IfcRelContainedInSpatialStructure: 4 = RelatedElements, 5 = RelatingStructure
        for rel in file.get_entities_by_type("IFCRELCONTAINEDINSPATIALSTRUCTURE") {
            if let Some(structure) = rel.get(5).and_then(StepValue::as_reference) {
                let elements = rel.get(4).map(StepValue::references).unwrap_or_default();
                relations.contained.entry(structure).or_default().extend(elements);
            }
        }

        // The remaining relations share 4 = RelatedObjects, 5 = relating entity.
        let per_object = [
            ("IFCRELDEFINESBYPROPERTIES", &mut relations.property_sets),
            ("IFCRELASSOCIATESMATERIAL", &mut relations.materials),
            ("IFCRELDEFINESBYTYPE", &mut relations.types),
        ];
        for (rel_type, index) in per_object {
            for rel in file.get_entities_by_type(rel_type) {
                let Some(relating) = rel.get(5).and_then(StepValue::as_reference) else {
                    continue;
                };
                for object in rel.get(4).map(StepValue::references).unwrap_or_default() {
                    index.entry(object).or_default().push(relating);
                }
            }
        }

        relations
    }
}

#[derive(Debug)]
struct OpenModel {
    file: StepFile,
    relations: Relations,
}

/// Bundled engine over plain-text STEP (ISO 10303-21) IFC files.
#[derive(Debug)]
pub struct StepEngine {
    schema: TypeSchema,
    models: HashMap<u32, OpenModel>,
    next_handle: u32,
}

impl StepEngine {
    /// The schema is used to report numeric type codes, as the engine's records do.
    #[must_use]
    pub fn new(schema: TypeSchema) -> Self {
        Self {
            schema,
            models: HashMap::new(),
            next_handle: 0,
        }
    }

    fn model(&self, handle: ModelHandle) -> Result<&OpenModel, EngineError> {
        self.models
            .get(&handle.0)
            .ok_or(EngineError::UnknownHandle(handle.0))
    }

    fn type_json(&self, entity_type: &str) -> Value {
        match self.schema.encode(entity_type) {
            TypeCode::Numeric(code) => json!(code),
            TypeCode::Name(name) => json!(name),
        }
    }

    fn entity_json(&self, file: &StepFile, id: u32, depth: usize, trail: &mut Vec<u32>) -> Value {
        let Some(entity) = file.get_entity(id) else {
            return reference(id);
        };

        trail.push(id);
        let mut record = Map::new();
        record.insert("expressID".to_string(), json!(id));
        record.insert("type".to_string(), self.type_json(&entity.entity_type));

        let names = attribute_names(entity);
        for (index, value) in entity.values.iter().enumerate() {
            let key = names
                .get(index)
                .map_or_else(|| format!("Arg{index}"), |name| (*name).to_string());
            let resolve = depth > 0 && !KEEP_AS_REFERENCE.contains(&key.as_str());
            let converted = self.value_json(file, value, resolve.then_some(depth), trail);
            record.insert(key, converted);
        }
        trail.pop();

        Value::Object(record)
    }

    fn value_json(
        &self,
        file: &StepFile,
        value: &StepValue,
        depth: Option<usize>,
        trail: &mut Vec<u32>,
    ) -> Value {
        match value {
            StepValue::String(s) => holder(STRING_TAG, json!(s)),
            StepValue::Enum(e) => holder(ENUM_TAG, json!(e)),
            StepValue::Boolean(b) => {
                let mut flag = holder(ENUM_TAG, json!(if *b { "T" } else { "F" }));
                flag["label"] = json!("IFCBOOLEAN");
                flag
            }
            StepValue::Real(f) => holder(REAL_TAG, json!(f)),
            StepValue::Integer(i) => holder(INTEGER_TAG, json!(i)),
            StepValue::Reference(id) => match depth {
                Some(depth) if !trail.contains(id) => self.entity_json(file, *id, depth - 1, trail),
                _ => reference(*id),
            },
            StepValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value_json(file, item, depth, trail))
                    .collect(),
            ),
            StepValue::Typed { label, value } => {
                let mut inner = self.value_json(file, value, depth, trail);
                if let Value::Object(map) = &mut inner {
                    map.insert("label".to_string(), json!(label));
                }
                inner
            }
            StepValue::Null | StepValue::Derived => Value::Null,
        }
    }

    fn resolved(&self, file: &StepFile, ids: &[u32]) -> Vec<Value> {
        ids.iter()
            .map(|id| self.entity_json(file, *id, RESOLVE_DEPTH, &mut Vec::new()))
            .collect()
    }

    fn spatial_node(
        model: &OpenModel,
        id: u32,
        schema: &TypeSchema,
        include_properties: bool,
        visited: &mut HashSet<u32>,
    ) -> Option<SpatialNode> {
        if !visited.insert(id) {
            return None;
        }
        let entity = model.file.get_entity(id)?;

        let mut node = SpatialNode::new(id, schema.encode(&entity.entity_type));
        if include_properties {
            node.name = entity.get(2).and_then(StepValue::as_str).map(str::to_string);
        }

        let relations = &model.relations;
        let child_ids = relations
            .aggregates
            .get(&id)
            .into_iter()
            .chain(relations.contained.get(&id))
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        node.children = child_ids
            .into_iter()
            .filter_map(|child| Self::spatial_node(model, child, schema, include_properties, visited))
            .collect();

        Some(node)
    }
}

fn holder(tag: u64, value: Value) -> Value {
    json!({ "type": tag, "value": value })
}

fn reference(id: u32) -> Value {
    holder(REFERENCE_TAG, json!(id))
}

impl IfcEngine for StepEngine {
    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError> {
        let content = String::from_utf8_lossy(bytes);
        let file = StepFile::parse(&content)?;
        let relations = Relations::build(&file);

        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(
            handle = handle.0,
            schema = %file.schema,
            entities = file.entities.len(),
            "Opened STEP model"
        );
        self.models.insert(handle.0, OpenModel { file, relations });
        Ok(handle)
    }

    fn close_model(&mut self, handle: ModelHandle) -> Result<(), EngineError> {
        self.models
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(EngineError::UnknownHandle(handle.0))
    }

    fn spatial_structure(
        &self,
        handle: ModelHandle,
        include_properties: bool,
    ) -> Result<SpatialNode, EngineError> {
        let model = self.model(handle)?;
        let project = model
            .file
            .get_entities_by_type("IFCPROJECT")
            .first()
            .map(|e| e.id)
            .ok_or_else(|| EngineError::query("spatial structure", "model has no IFCPROJECT"))?;

        Self::spatial_node(
            model,
            project,
            &self.schema,
            include_properties,
            &mut HashSet::new(),
        )
        .ok_or_else(|| EngineError::query("spatial structure", "project entity unreadable"))
    }

    fn all_entity_ids(&self, handle: ModelHandle) -> Result<Vec<u32>, EngineError> {
        Ok(self.model(handle)?.file.sorted_ids())
    }

    fn line(&self, handle: ModelHandle, id: u32) -> Result<Value, EngineError> {
        let model = self.model(handle)?;
        if model.file.get_entity(id).is_none() {
            return Err(EngineError::UnknownEntity(id));
        }
        Ok(self.entity_json(&model.file, id, 0, &mut Vec::new()))
    }

    fn property_sets(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.model(handle)?;
        let ids = model.relations.property_sets.get(&id).map_or(&[][..], Vec::as_slice);
        Ok(self.resolved(&model.file, ids))
    }

    fn materials(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.model(handle)?;
        let ids = model.relations.materials.get(&id).map_or(&[][..], Vec::as_slice);
        Ok(self.resolved(&model.file, ids))
    }

    fn type_properties(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.model(handle)?;
        let ids = model.relations.types.get(&id).map_or(&[][..], Vec::as_slice);
        Ok(self.resolved(&model.file, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODEL: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('p',$,'Demo',$,$,$,$,$,$);
#2=IFCSITE('s',$,'Site',$,$,$,$,$,$,$,$,$,$,$);
#3=IFCBUILDINGSTOREY('b',$,'Level 1',$,$,$,$,$,$,0.);
#4=IFCRELAGGREGATES('r1',$,$,$,#1,(#2));
#5=IFCRELAGGREGATES('r2',$,$,$,#2,(#3));
#10=IFCWALL('w',$,'Wall A',$,$,$,$,$);
#11=IFCSPACE('sp',$,'Room',$,$,$,$,$,$,$,$);
#12=IFCRELCONTAINEDINSPATIALSTRUCTURE('r3',$,$,$,(#10,#11),#3);
#20=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#21=IFCPROPERTYSET('ps',$,'Pset_WallCommon',$,(#20));
#22=IFCRELDEFINESBYPROPERTIES('r4',$,$,$,(#10),#21);
#30=IFCMATERIAL('Brick',$,$);
#31=IFCRELASSOCIATESMATERIAL('r5',$,$,$,(#10),#30);
ENDSEC;
END-ISO-10303-21;
";

    fn engine() -> (StepEngine, ModelHandle) {
        let mut engine = StepEngine::new(TypeSchema::bundled().unwrap());
        let handle = engine.open_model(MODEL.as_bytes()).unwrap();
        (engine, handle)
    }

    #[test]
    fn builds_spatial_tree_in_file_order() {
        let (engine, handle) = engine();
        let tree = engine.spatial_structure(handle, true).unwrap();
        assert_eq!(tree.id, 1);
        assert_eq!(tree.name.as_deref(), Some("Demo"));
        let storey = &tree.children[0].children[0];
        assert_eq!(storey.id, 3);
        let ids: Vec<u32> = storey.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn reports_numeric_type_codes() {
        let (engine, handle) = engine();
        let line = engine.line(handle, 10).unwrap();
        assert_eq!(line["type"], json!(2_391_406_946_u32));
        assert_eq!(line["Name"]["value"], "Wall A");
        assert_eq!(line["GlobalId"]["value"], "w");
    }

    #[test]
    fn resolves_property_sets_and_materials() {
        let (engine, handle) = engine();
        let psets = engine.property_sets(handle, 10).unwrap();
        assert_eq!(psets.len(), 1);
        let prop = &psets[0]["HasProperties"][0];
        assert_eq!(prop["Name"]["value"], "IsExternal");
        assert_eq!(prop["NominalValue"]["label"], "IFCBOOLEAN");
        assert_eq!(prop["NominalValue"]["value"], "T");

        let materials = engine.materials(handle, 10).unwrap();
        assert_eq!(materials[0]["Name"]["value"], "Brick");
        assert!(engine.materials(handle, 11).unwrap().is_empty());
    }

    #[test]
    fn unknown_entities_and_handles_are_errors() {
        let (mut engine, handle) = engine();
        assert!(matches!(engine.line(handle, 999), Err(EngineError::UnknownEntity(999))));
        engine.close_model(handle).unwrap();
        assert!(matches!(
            engine.close_model(handle),
            Err(EngineError::UnknownHandle(_))
        ));
        assert!(engine.all_entity_ids(handle).is_err());
    }

    #[test]
    fn rejects_garbage_buffers() {
        let mut engine = StepEngine::new(TypeSchema::bundled().unwrap());
        assert!(matches!(
            engine.open_model(b"not an ifc file"),
            Err(EngineError::Open { .. })
        ));
    }
}
