use super::*;

/// Comparing methods for field paths.
pub trait PathCompare {
    fn equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn not_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn is_in<T>(&self, vals: Vec<T>) -> Filter
    where
        T: Into<QueryValue>;

    fn greater_than<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn greater_than_or_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn less_than<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn less_than_or_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>;

    fn spatial(&self, operator: SpatialOperator, geometry: GeometryInput) -> Filter;
}

impl<P> PathCompare for P
where
    P: Into<FieldPath> + Clone,
{
    fn equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::Equals {
            path: self.clone().into(),
            value: val.into(),
        }
    }

    fn not_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::not(self.equals(val))
    }

    fn is_in<T>(&self, vals: Vec<T>) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::In {
            path: self.clone().into(),
            values: vals.into_iter().map(Into::into).collect(),
        }
    }

    fn greater_than<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::GreaterThan {
            path: self.clone().into(),
            value: val.into(),
            inclusive: false,
        }
    }

    fn greater_than_or_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::GreaterThan {
            path: self.clone().into(),
            value: val.into(),
            inclusive: true,
        }
    }

    fn less_than<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::LowerThan {
            path: self.clone().into(),
            value: val.into(),
            inclusive: false,
        }
    }

    fn less_than_or_equals<T>(&self, val: T) -> Filter
    where
        T: Into<QueryValue>,
    {
        Filter::LowerThan {
            path: self.clone().into(),
            value: val.into(),
            inclusive: true,
        }
    }

    fn spatial(&self, operator: SpatialOperator, geometry: GeometryInput) -> Filter {
        Filter::Spatial(SpatialFilter {
            path: self.clone().into(),
            operator,
            geometry: Some(geometry),
            srid: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dotted_paths_strip_one_hop_at_a_time() {
        let filter = "brewery.address.city".equals("Amsterdam");
        let once = filter.strip_first_hop().unwrap();

        assert_eq!(once.path().unwrap().to_string(), "address.city");
        assert_eq!(
            once.strip_first_hop().unwrap(),
            Filter::Equals {
                path: FieldPath::from("city"),
                value: QueryValue::from("Amsterdam"),
            }
        );
        assert_eq!(once.strip_first_hop().unwrap().strip_first_hop(), None);
    }

    #[test]
    fn not_equals_wraps_equals() {
        assert_eq!("name".not_equals("X"), Filter::not("name".equals("X")));
    }
}
