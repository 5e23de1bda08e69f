//! Filtro y selección de listas en memoria
//!
//! `FilteredList` mantiene la lista original, el término de búsqueda y el
//! filtro de categoría; la lista filtrada se recalcula en cada cambio y la
//! selección vuelve a `None` cada vez que se recalcula.

/// Entidades que pueden buscarse por texto
pub trait Searchable {
    /// Campos de texto donde se busca el término (1 a 4)
    fn search_fields(&self) -> Vec<&str>;

    /// Valor de categoría por defecto (estado, marca, tipo...)
    fn category(&self) -> Option<&str> {
        None
    }
}

/// Valor centinela para mostrar todas las categorías
pub const ALL_CATEGORIES: &str = "Todos";

/// Filtro de categoría por igualdad exacta
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    /// Interpreta el valor de un selector; el centinela o vacío es `All`
    pub fn from_label(label: &str) -> Self {
        if label.is_empty() || label == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Exact(label.to_string())
        }
    }

    fn accepts(&self, category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(expected) => category == Some(expected.as_str()),
        }
    }
}

/// Teclas de navegación de la tabla
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Extractor de categoría alternativo al de `Searchable`
pub type CategoryFn<T> = fn(&T) -> Option<&str>;

/// Extractor de campo para ordenar
pub type SortKeyFn<T> = fn(&T) -> &str;

pub struct FilteredList<T: Searchable> {
    source: Vec<T>,
    term: String,
    category: CategoryFilter,
    category_fn: Option<CategoryFn<T>>,
    sort_key: Option<SortKeyFn<T>>,
    // Índices en `source` de las filas visibles
    visible: Vec<usize>,
    selected: Option<usize>,
    page_size: usize,
}

impl<T: Searchable> FilteredList<T> {
    pub fn new(source: Vec<T>) -> Self {
        let mut list = Self {
            source,
            term: String::new(),
            category: CategoryFilter::All,
            category_fn: None,
            sort_key: None,
            visible: Vec::new(),
            selected: None,
            page_size: 10,
        };
        list.recompute();
        list
    }

    /// Usa otro extractor de categoría (p. ej. marca del vehículo)
    pub fn with_category_fn(mut self, category_fn: CategoryFn<T>) -> Self {
        self.category_fn = Some(category_fn);
        self.recompute();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Ordena las filas visibles por un campo, sin distinguir mayúsculas
    pub fn sort_by(&mut self, key: SortKeyFn<T>) {
        self.sort_key = Some(key);
        self.recompute();
    }

    pub fn set_source(&mut self, source: Vec<T>) {
        self.source = source;
        self.recompute();
    }

    pub fn set_search(&mut self, term: &str) {
        self.term = term.to_string();
        self.recompute();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.recompute();
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn category_filter(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    /// Filas visibles en orden
    pub fn items(&self) -> Vec<&T> {
        self.visible.iter().map(|&i| &self.source[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.visible.get(index).map(|&i| &self.source[i])
    }

    /// Categorías distintas presentes en la lista original, para el selector
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .source
            .iter()
            .filter_map(|item| self.category_of(item))
            .map(str::to_string)
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|index| self.get(index))
    }

    /// Selecciona una fila visible; un índice fuera de rango limpia la selección
    pub fn select(&mut self, index: usize) -> Option<&T> {
        self.selected = (index < self.visible.len()).then_some(index);
        self.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Mueve la selección; se limita a `[0, len-1]` y nunca da la vuelta
    pub fn navigate(&mut self, key: NavKey) -> Option<usize> {
        if self.visible.is_empty() {
            self.selected = None;
            return None;
        }
        let last = self.visible.len() - 1;
        let current = self.selected;
        let target = match (key, current) {
            (NavKey::Home, _) => 0,
            (NavKey::End, _) => last,
            (_, None) => 0,
            (NavKey::Up, Some(i)) => i.saturating_sub(1),
            (NavKey::Down, Some(i)) => i.saturating_add(1),
            (NavKey::PageUp, Some(i)) => i.saturating_sub(self.page_size),
            (NavKey::PageDown, Some(i)) => i.saturating_add(self.page_size),
        };
        self.selected = Some(target.min(last));
        self.selected
    }

    fn category_of<'a>(&self, item: &'a T) -> Option<&'a str> {
        match self.category_fn {
            Some(category_fn) => category_fn(item),
            None => item.category(),
        }
    }

    fn matches(&self, item: &T, needle: &str) -> bool {
        let text_ok = needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
        text_ok && self.category.accepts(self.category_of(item))
    }

    fn recompute(&mut self) {
        let needle = self.term.to_lowercase();
        let mut visible: Vec<usize> = (0..self.source.len())
            .filter(|&i| self.matches(&self.source[i], &needle))
            .collect();
        if let Some(key) = self.sort_key {
            visible.sort_by_cached_key(|&i| key(&self.source[i]).to_lowercase());
        }
        self.visible = visible;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        codigo: &'static str,
        nombre: &'static str,
        estado: &'static str,
    }

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.codigo, self.nombre]
        }

        fn category(&self) -> Option<&str> {
            Some(self.estado)
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { codigo: "C01", nombre: "Juan Pérez", estado: "Vigente" },
            Row { codigo: "C02", nombre: "ana torres", estado: "Doc. Vencidos" },
            Row { codigo: "C03", nombre: "Pedro Juárez", estado: "Vigente" },
            Row { codigo: "X99", nombre: "Luis Ana", estado: "Sin Documentos" },
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_subset() {
        let mut list = FilteredList::new(rows());
        for term in ["ana", "ANA", "c0", "juan", "zzz", ""] {
            list.set_search(term);
            let needle = term.to_lowercase();
            for item in list.items() {
                assert!(list.source().contains(item));
                assert!(item
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle)));
            }
        }
        list.set_search("ANA");
        let codigos: Vec<&str> = list.items().iter().map(|r| r.codigo).collect();
        assert_eq!(codigos, vec!["C02", "X99"]);
    }

    #[test]
    fn test_category_filter_exact_and_sentinel() {
        let mut list = FilteredList::new(rows());
        list.set_category(CategoryFilter::from_label("Vigente"));
        assert_eq!(list.len(), 2);
        list.set_category(CategoryFilter::from_label("Vig"));
        assert!(list.is_empty());
        list.set_category(CategoryFilter::from_label(ALL_CATEGORIES));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_search_and_category_combine() {
        let mut list = FilteredList::new(rows());
        list.set_search("j");
        list.set_category(CategoryFilter::Exact("Vigente".to_string()));
        let codigos: Vec<&str> = list.items().iter().map(|r| r.codigo).collect();
        assert_eq!(codigos, vec!["C01", "C03"]);
    }

    #[test]
    fn test_changes_reset_selection() {
        let mut list = FilteredList::new(rows());
        list.select(1);
        list.set_search("c");
        assert_eq!(list.selected_index(), None);

        list.select(0);
        list.set_category(CategoryFilter::All);
        assert_eq!(list.selected_index(), None);

        list.select(0);
        list.set_source(rows());
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn test_select_out_of_range_clears() {
        let mut list = FilteredList::new(rows());
        assert_eq!(list.select(2).map(|r| r.codigo), Some("C03"));
        assert!(list.select(10).is_none());
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn test_navigation_clamps_without_wrapping() {
        let mut list = FilteredList::new(rows()).with_page_size(2);
        assert_eq!(list.navigate(NavKey::Up), Some(0));
        assert_eq!(list.navigate(NavKey::Up), Some(0));
        assert_eq!(list.navigate(NavKey::Down), Some(1));
        assert_eq!(list.navigate(NavKey::PageDown), Some(3));
        assert_eq!(list.navigate(NavKey::Down), Some(3));
        assert_eq!(list.navigate(NavKey::PageDown), Some(3));
        assert_eq!(list.navigate(NavKey::PageUp), Some(1));
        assert_eq!(list.navigate(NavKey::PageUp), Some(0));
        assert_eq!(list.navigate(NavKey::End), Some(3));
        assert_eq!(list.navigate(NavKey::Home), Some(0));
    }

    #[test]
    fn test_navigation_on_empty_list() {
        let mut list = FilteredList::new(rows());
        list.set_search("no existe");
        assert_eq!(list.navigate(NavKey::Down), None);
        assert_eq!(list.navigate(NavKey::End), None);
    }

    #[test]
    fn test_custom_category_and_sort() {
        fn first_letter(row: &Row) -> Option<&str> {
            row.codigo.get(..1)
        }
        let mut list = FilteredList::new(rows()).with_category_fn(first_letter);
        assert_eq!(list.categories(), vec!["C".to_string(), "X".to_string()]);
        list.set_category(CategoryFilter::Exact("C".to_string()));
        list.sort_by(|row| row.nombre);
        let nombres: Vec<&str> = list.items().iter().map(|r| r.nombre).collect();
        assert_eq!(nombres, vec!["ana torres", "Juan Pérez", "Pedro Juárez"]);
    }
}
