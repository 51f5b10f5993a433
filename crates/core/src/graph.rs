use rustc_hash::FxHashMap;

use gschem_utils::idmap::IdMap;

use crate::{Bounds, Object, ObjectId, ObjectKind, Point};

/// The objects of one schematic document in drawing order.
///
/// Objects are addressed with [`ObjectId`]s that are never reused, so ids
/// held by the caller can never point to a different object after a
/// removal. Drawing order lists every top level object in the order it was
/// added, each followed by its attributes. This is also the order the file
/// format stores them in.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    objects: IdMap<ObjectId, Object>,
}

impl ObjectGraph {
    pub fn new() -> ObjectGraph {
        ObjectGraph::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn add(&mut self, kind: ObjectKind) -> ObjectId {
        self.objects.insert(Object::new(kind))
    }

    /// Add an object as is, attribute links are dropped as they would point
    /// into another graph.
    pub fn add_object(&mut self, mut object: Object) -> ObjectId {
        object.attribs.clear();
        object.attached_to = None;
        self.objects.insert(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    /// Objects in drawing order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.objects
            .iter()
            .filter(|(_, obj)| obj.attached_to.is_none())
            .flat_map(move |(id, obj)| {
                let attribs = obj
                    .attribs
                    .iter()
                    .filter_map(move |a| Some((*a, self.objects.get(a)?)));
                std::iter::once((id, obj)).chain(attribs)
            })
    }

    /// Last added object that is still in the graph
    pub fn last(&self) -> Option<ObjectId> {
        self.objects.last_key()
    }

    /// Remove an object together with its attributes. Removing an attribute
    /// detaches it from its owner first.
    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let object = self.objects.remove(&id)?;

        if let Some(owner) = object.attached_to {
            if let Some(owner) = self.objects.get_mut(&owner) {
                owner.attribs.retain(|a| *a != id);
            }
        }

        for attrib in &object.attribs {
            self.objects.remove(attrib);
        }

        Some(object)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Attach `attrib` to `owner`. Only text can be an attribute, an
    /// attribute cannot own attributes and an object cannot own itself. An
    /// attribute attached elsewhere is moved.
    pub fn attach(&mut self, owner: ObjectId, attrib: ObjectId) -> bool {
        match self.objects.get(&owner) {
            Some(obj) if owner != attrib && obj.attached_to.is_none() => {}
            _ => return false,
        }

        let previous = match self.objects.get(&attrib) {
            Some(obj) if obj.as_text().is_some() && obj.attribs.is_empty() => obj.attached_to,
            _ => return false,
        };

        if let Some(previous) = previous {
            if previous == owner {
                return true;
            }
            self.detach(attrib);
        }

        self.objects[attrib].attached_to = Some(owner);
        self.objects[owner].attribs.push(attrib);
        true
    }

    pub fn detach(&mut self, attrib: ObjectId) {
        let Some(owner) = self.objects.get_mut(&attrib).and_then(|a| a.attached_to.take()) else {
            return;
        };

        if let Some(owner) = self.objects.get_mut(&owner) {
            owner.attribs.retain(|a| *a != attrib);
        }
    }

    /// Find the value of attribute `name` attached to `owner`
    pub fn attribute_value(&self, owner: ObjectId, name: &str) -> Option<&str> {
        let owner = self.objects.get(&owner)?;
        owner.attribs.iter().find_map(|id| {
            let text = self.objects.get(id)?.as_text()?;
            let (n, v) = text.attribute()?;
            (n == name).then_some(v)
        })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.objects
            .values()
            .filter_map(Object::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Move an object and everything attached to it
    pub fn translate(&mut self, id: ObjectId, dx: i32, dy: i32) {
        self.for_object_and_attribs(id, |obj| obj.translate(dx, dy));
    }

    pub fn rotate(&mut self, id: ObjectId, center: Point, angle: i32) {
        self.for_object_and_attribs(id, |obj| obj.rotate(center, angle));
    }

    pub fn mirror(&mut self, id: ObjectId, cx: i32) {
        self.for_object_and_attribs(id, |obj| obj.mirror(cx));
    }

    fn for_object_and_attribs<F: FnMut(&mut Object)>(&mut self, id: ObjectId, mut f: F) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        f(obj);

        let attribs = obj.attribs.clone();
        for attrib in attribs {
            if let Some(obj) = self.objects.get_mut(&attrib) {
                f(obj);
            }
        }
    }

    /// Append a copy of every object in `src` to `dest`.
    ///
    /// The copies get fresh ids in `dest`, are added in drawing order and
    /// attribute links in both directions are remapped to the copies.
    /// Returns the mapping from source ids to the new ids.
    pub fn deep_copy_into(
        dest: &mut ObjectGraph,
        src: &ObjectGraph,
    ) -> FxHashMap<ObjectId, ObjectId> {
        let mut mapping = FxHashMap::default();

        for (id, obj) in src.iter() {
            let copy = Object {
                kind: obj.kind.clone(),
                color: obj.color,
                attribs: vec![],
                attached_to: None,
            };
            let new_id = dest.objects.insert(copy);
            mapping.insert(id, new_id);
        }

        for (id, obj) in src.iter() {
            let new_id = mapping[&id];
            let copy = &mut dest.objects[new_id];
            copy.attribs = obj
                .attribs
                .iter()
                .filter_map(|a| mapping.get(a).copied())
                .collect();
            copy.attached_to = obj.attached_to.and_then(|o| mapping.get(&o).copied());
        }

        mapping
    }

    /// A new graph that shares nothing with this one
    pub fn deep_copy(&self) -> ObjectGraph {
        let mut copy = ObjectGraph::new();
        ObjectGraph::deep_copy_into(&mut copy, self);
        copy
    }

    /// Position of every object in drawing order
    fn positions(&self) -> FxHashMap<ObjectId, usize> {
        self.iter()
            .enumerate()
            .map(|(pos, (id, _))| (id, pos))
            .collect()
    }
}

/// Structural equality: same objects in the same drawing order with the
/// same attribute links. Ids do not take part in the comparison.
impl PartialEq for ObjectGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let pos_a = self.positions();
        let pos_b = other.positions();
        let owner_a = |obj: &Object| obj.attached_to.map(|o| pos_a.get(&o).copied());
        let owner_b = |obj: &Object| obj.attached_to.map(|o| pos_b.get(&o).copied());
        let attribs_a = |obj: &Object| -> Vec<Option<usize>> {
            obj.attribs.iter().map(|id| pos_a.get(id).copied()).collect()
        };
        let attribs_b = |obj: &Object| -> Vec<Option<usize>> {
            obj.attribs.iter().map(|id| pos_b.get(id).copied()).collect()
        };

        self.iter().zip(other.iter()).all(|((_, a), (_, b))| {
            a.kind == b.kind
                && a.color == b.color
                && owner_a(a) == owner_b(b)
                && attribs_a(a) == attribs_b(b)
        })
    }
}

impl Eq for ObjectGraph {}

impl std::ops::Index<ObjectId> for ObjectGraph {
    type Output = Object;

    fn index(&self, index: ObjectId) -> &Self::Output {
        &self.objects[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Circle, Line, Text};

    fn resistor(graph: &mut ObjectGraph) -> (ObjectId, ObjectId) {
        let body = graph.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(300, 0))));
        let refdes = graph.add(ObjectKind::Text(Text::new(Point::new(0, 100), "refdes=R1")));
        assert!(graph.attach(body, refdes));
        (body, refdes)
    }

    #[test]
    fn attach_and_remove() {
        let mut graph = ObjectGraph::new();
        let (body, refdes) = resistor(&mut graph);

        assert_eq!(graph[body].attributes(), &[refdes]);
        assert_eq!(graph[refdes].attached_to(), Some(body));
        assert_eq!(graph.attribute_value(body, "refdes"), Some("R1"));

        // Lines cannot be attributes
        let other = graph.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(1, 1))));
        assert!(!graph.attach(body, other));

        graph.remove(body);
        assert!(!graph.contains(refdes));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn removing_attribute_detaches() {
        let mut graph = ObjectGraph::new();
        let (body, refdes) = resistor(&mut graph);
        graph.remove(refdes);
        assert!(graph[body].attributes().is_empty());
    }

    #[test]
    fn attributes_follow_owner() {
        let mut graph = ObjectGraph::new();
        let (body, refdes) = resistor(&mut graph);
        graph.translate(body, 10, 20);

        let text = graph[refdes].as_text().unwrap();
        assert_eq!(text.origin, Point::new(10, 120));
    }

    #[test]
    fn deep_copy_remaps_attributes() {
        let mut graph = ObjectGraph::new();
        graph.add(ObjectKind::Circle(Circle::new(Point::new(5, 5), 5)));
        let (body, refdes) = resistor(&mut graph);

        let mut dest = ObjectGraph::new();
        // Push ids forward so that the copy cannot accidentally reuse them
        let filler = dest.add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 1)));
        dest.remove(filler);

        let mapping = ObjectGraph::deep_copy_into(&mut dest, &graph);
        let new_body = mapping[&body];
        let new_refdes = mapping[&refdes];

        assert_ne!(new_body, body);
        assert_eq!(dest[new_body].attributes(), &[new_refdes]);
        assert_eq!(dest[new_refdes].attached_to(), Some(new_body));
        assert_eq!(dest, graph);

        // Changing the copy leaves the original alone
        dest.translate(new_body, 1, 1);
        assert_ne!(dest, graph);
    }

    #[test]
    fn structural_equality_checks_links() {
        let mut a = ObjectGraph::new();
        let (_, _) = resistor(&mut a);

        let mut b = ObjectGraph::new();
        b.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(300, 0))));
        b.add(ObjectKind::Text(Text::new(Point::new(0, 100), "refdes=R1")));

        assert_ne!(a, b);
    }

    #[test]
    fn attributes_are_drawn_after_owner() {
        let mut graph = ObjectGraph::new();
        let circle = graph.add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 10)));
        let line = graph.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(5, 5))));
        let value = graph.add(ObjectKind::Text(Text::new(Point::new(0, 20), "value=10k")));
        assert!(graph.attach(circle, value));

        let order: Vec<ObjectId> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![circle, value, line]);

        let copy = graph.deep_copy();
        assert_eq!(copy, graph);
        let order: Vec<char> = copy.iter().map(|(_, o)| o.kind.type_char()).collect();
        assert_eq!(order, vec!['V', 'T', 'L']);

        // Attributes cannot own attributes
        let nested = graph.add(ObjectKind::Text(Text::new(Point::new(0, 40), "a=b")));
        assert!(!graph.attach(value, nested));
    }

    #[test]
    fn graph_bounds() {
        let mut graph = ObjectGraph::new();
        assert!(graph.bounds().is_none());
        graph.add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 10)));
        graph.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(100, 50))));
        assert_eq!(graph.bounds(), Some(Bounds::new(-10, -10, 100, 50)));
    }
}
