use crate::config::PipelineOptions;
use crate::engine::IfcEngine;
use crate::model::raw::{text_field, type_tag};
use crate::model::{ModelElement, SpatialNode};
use crate::normalize::{normalize_materials, normalize_property_sets, normalize_type_properties};
use crate::process_log::ProcessLog;
use crate::schema::TypeSchema;
use crate::session::ModelSession;
use crate::walker::{flat_candidates, tree_candidates, Candidate};

/// Everything one run produces for the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// `None` when the engine could not build a spatial tree.
    pub tree: Option<SpatialNode>,
    pub elements: Vec<ModelElement>,
}

/// Selects candidates from the open model and normalizes each into a [`ModelElement`].
///
/// Query failures never abort the run:
/// - a failing spatial tree falls back to a flat listing of every entity
/// - a failing element line drops that element
/// - a failing property, material or type query leaves that collection empty
///
/// Every failure is appended to `log`.
///
/// # Example
///
/// ```
/// use ifc_property_inspector::config::PipelineOptions;
/// use ifc_property_inspector::engine::{MemoryEngine, MemoryModel};
/// use ifc_property_inspector::model::SpatialNode;
/// use ifc_property_inspector::pipeline::run;
/// use ifc_property_inspector::process_log::ProcessLog;
/// use ifc_property_inspector::schema::{TypeCode, TypeSchema};
/// use ifc_property_inspector::session::ModelSession;
/// use serde_json::json;
///
/// let model = MemoryModel::new()
///     .with_tree(SpatialNode::new(1, TypeCode::Name("IFCPROJECT".into()))
///         .with_children(vec![SpatialNode::new(2, TypeCode::Name("IFCWALL".into()))]))
///     .with_line(2, json!({ "expressID": 2, "Name": { "value": "Wall-01" } }));
/// let mut log = ProcessLog::new();
/// let mut session = ModelSession::new(MemoryEngine::new(model));
/// session.open(b"ISO-10303-21;", &mut log)?;
///
/// let output = run(&session, &TypeSchema::default(), &PipelineOptions::default(), &mut log);
/// assert_eq!(output.elements[0].display_name, "Wall-01");
/// # Ok::<(), ifc_property_inspector::error::EngineError>(())
/// ```
pub fn run<E: IfcEngine>(
    session: &ModelSession<E>,
    schema: &TypeSchema,
    options: &PipelineOptions,
    log: &mut ProcessLog,
) -> PipelineOutput {
    let _span = tracing::info_span!("pipeline", include_all = options.include_all).entered();

    let (tree, candidates) = match session.spatial_tree(true) {
        Ok(tree) => {
            let candidates = tree_candidates(&tree, schema, &options.filter, options.include_all);
            log.info(format!(
                "Spatial tree has {} nodes, {} candidates",
                tree.node_count(),
                candidates.len()
            ));
            (Some(tree), candidates)
        }
        Err(err) => {
            log.warn(format!("Spatial tree unavailable ({err}), scanning all entities"));
            (None, flat_listing(session, schema, options, log))
        }
    };

    let elements: Vec<ModelElement> = candidates
        .into_iter()
        .filter_map(|candidate| build_element(session, schema, options, &candidate, log))
        .collect();

    log.info(format!("Normalized {} elements", elements.len()));
    PipelineOutput { tree, elements }
}

fn flat_listing<E: IfcEngine>(
    session: &ModelSession<E>,
    schema: &TypeSchema,
    options: &PipelineOptions,
    log: &mut ProcessLog,
) -> Vec<Candidate> {
    let ids = match session.all_entity_ids() {
        Ok(ids) => ids,
        Err(err) => {
            log.error(format!("Entity listing failed: {err}"));
            return Vec::new();
        }
    };

    let mut typed = Vec::with_capacity(ids.len());
    for id in ids {
        match session.line(id) {
            Ok(line) => typed.extend(type_tag(&line).map(|code| (id, code))),
            Err(err) => log.warn(format!("Skipping #{id} in entity listing: {err}")),
        }
    }
    flat_candidates(typed, schema, &options.filter, options.include_all)
}

fn build_element<E: IfcEngine>(
    session: &ModelSession<E>,
    schema: &TypeSchema,
    options: &PipelineOptions,
    candidate: &Candidate,
    log: &mut ProcessLog,
) -> Option<ModelElement> {
    let id = candidate.id;
    let type_name = schema.resolve(&candidate.type_code);

    let line = match session.line(id) {
        Ok(line) => line,
        Err(err) => {
            log.error(format!("Skipping {type_name} #{id}: {err}"));
            return None;
        }
    };

    let mut property_sets = match session.property_sets(id) {
        Ok(records) => normalize_property_sets(&records, &options.normalize),
        Err(err) => {
            log.warn(format!("Property sets of #{id} unavailable: {err}"));
            Vec::new()
        }
    };

    match session.type_properties(id) {
        Ok(types) => property_sets.extend(normalize_type_properties(&types, &options.normalize)),
        Err(err) => log.warn(format!("Type properties of #{id} unavailable: {err}")),
    }

    let materials = match session.materials(id) {
        Ok(records) => normalize_materials(&records, schema),
        Err(err) => {
            log.warn(format!("Materials of #{id} unavailable: {err}"));
            Vec::new()
        }
    };

    let display_name = text_field(&line, "Name").unwrap_or_else(|| format!("{type_name} #{id}"));
    tracing::debug!(id, %type_name, sets = property_sets.len(), materials = materials.len(), "Normalized element");

    Some(ModelElement {
        id,
        type_code: candidate.type_code.clone(),
        type_name,
        display_name,
        global_id: text_field(&line, "GlobalId"),
        property_sets,
        materials,
    })
}
