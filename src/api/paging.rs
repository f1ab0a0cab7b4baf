// src/api/paging.rs

use serde::Deserialize;

// As rotas de listagem da API têm duas gerações: algumas devolvem um array
// puro, outras o envelope {data, total, page, limit}. Normalizamos aqui,
// na fronteira, para que nenhum serviço precise conhecer os dois formatos.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged { data: Vec<T>, total: i64 },
    Plain(Vec<T>),
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total: i64,
}

impl<T> ListResponse<T> {
    pub fn into_paged(self) -> Paged<T> {
        match self {
            ListResponse::Paged { data, total } => Paged { data, total },
            ListResponse::Plain(data) => {
                let total = data.len() as i64;
                Paged { data, total }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn bare_array_is_normalized() {
        let parsed: ListResponse<Row> = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).unwrap();
        let paged = parsed.into_paged();
        assert_eq!(paged.total, 2);
        assert_eq!(paged.data, vec![Row { id: 1 }, Row { id: 2 }]);
    }

    #[test]
    fn envelope_is_normalized() {
        let parsed: ListResponse<Row> =
            serde_json::from_str(r#"{"data":[{"id":7}],"total":42,"page":1,"limit":50}"#).unwrap();
        let paged = parsed.into_paged();
        assert_eq!(paged.total, 42);
        assert_eq!(paged.data, vec![Row { id: 7 }]);
    }
}
