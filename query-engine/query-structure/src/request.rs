use crate::{AggregateObjectRequest, Filter, JoinCriteria, KeyMap, QueryValue, SortCriteria};

/// A scalar field in the response, optionally renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedField {
    pub name: String,
    pub alias: String,
    /// Output SRID for geometry fields.
    pub srid: Option<i32>,
}

impl SelectedField {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            alias: name.clone(),
            name,
            srid: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }
}

impl From<&str> for SelectedField {
    fn from(name: &str) -> Self {
        SelectedField::new(name)
    }
}

/// A nested object in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFieldRequest {
    pub field: String,
    pub alias: String,
    pub request: ObjectRequest,
}

/// A named value selecting a context-scoped variant of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextCriteria {
    pub name: String,
    pub value: QueryValue,
}

impl ContextCriteria {
    pub fn new(name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Paging {
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    pub fn limit(limit: u64) -> Self {
        Self {
            offset: None,
            limit: Some(limit),
        }
    }
}

/// One node of the requested result tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRequest {
    pub entity: String,
    pub selected_fields: Vec<SelectedField>,
    pub object_fields: Vec<ObjectFieldRequest>,
    pub aggregate_fields: Vec<AggregateObjectRequest>,
    pub filters: Vec<Filter>,
    pub sort: Vec<SortCriteria>,
    pub paging: Option<Paging>,
    /// Key-field values of the rows to fetch; empty fetches all rows.
    pub keys: Vec<KeyMap>,
    pub context: Vec<ContextCriteria>,
}

impl ObjectRequest {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            selected_fields: Vec::new(),
            object_fields: Vec::new(),
            aggregate_fields: Vec::new(),
            filters: Vec::new(),
            sort: Vec::new(),
            paging: None,
            keys: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn select(mut self, field: impl Into<SelectedField>) -> Self {
        self.selected_fields.push(field.into());
        self
    }

    pub fn select_all<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.selected_fields.extend(fields.into_iter().map(SelectedField::new));
        self
    }

    pub fn object(self, field: impl Into<String>, request: ObjectRequest) -> Self {
        let field = field.into();
        self.object_as(field.clone(), field, request)
    }

    pub fn object_as(mut self, field: impl Into<String>, alias: impl Into<String>, request: ObjectRequest) -> Self {
        self.object_fields.push(ObjectFieldRequest {
            field: field.into(),
            alias: alias.into(),
            request,
        });
        self
    }

    pub fn aggregate(mut self, aggregate: AggregateObjectRequest) -> Self {
        self.aggregate_fields.push(aggregate);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sort: SortCriteria) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn paging(mut self, paging: Paging) -> Self {
        self.paging = Some(paging);
        self
    }

    pub fn key(mut self, key: KeyMap) -> Self {
        self.keys.push(key);
        self
    }

    pub fn context(mut self, criteria: ContextCriteria) -> Self {
        self.context.push(criteria);
        self
    }

    /// Whether anything besides the selection restricts or orders the rows.
    pub fn has_row_criteria(&self) -> bool {
        !self.filters.is_empty()
            || !self.sort.is_empty()
            || self.paging.is_some()
            || !self.keys.is_empty()
            || !self.context.is_empty()
    }
}

/// A root object request together with criteria applying to the set of root rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRequest {
    pub object: ObjectRequest,
    pub filters: Vec<Filter>,
    pub sort: Vec<SortCriteria>,
    pub paging: Option<Paging>,
}

impl CollectionRequest {
    pub fn new(object: ObjectRequest) -> Self {
        Self {
            object,
            filters: Vec::new(),
            sort: Vec::new(),
            paging: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sort: SortCriteria) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn paging(mut self, paging: Paging) -> Self {
        self.paging = Some(paging);
        self
    }
}

impl From<ObjectRequest> for CollectionRequest {
    fn from(object: ObjectRequest) -> Self {
        CollectionRequest::new(object)
    }
}

/// Fetches the `field` relation of `entity` for every parent key in one query.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub entity: String,
    pub field: String,
    pub keys: JoinCriteria,
    /// The request for the related entity, applied per parent.
    pub request: ObjectRequest,
}

impl BatchRequest {
    pub fn new(entity: impl Into<String>, field: impl Into<String>, keys: JoinCriteria, request: ObjectRequest) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
            keys,
            request,
        }
    }
}
