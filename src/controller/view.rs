//! Server-rendered pages.
//!
//! Plain HTML tables and forms. Every interpolated value goes through
//! [`escape`].

use std::fmt::Write;

use crate::model::{Contact, Person};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h3>{title}</h3>\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

fn id_text(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

pub fn home() -> String {
    layout(
        "Agenda",
        "<ul>\n<li><a href=\"/pessoas\">Pessoas</a></li>\n<li><a href=\"/contatos\">Contatos</a></li>\n</ul>\n",
    )
}

pub fn people(people: &[Person]) -> String {
    let mut body = String::from(
        "<form method=\"POST\" action=\"/pessoas\">\n\
         <label>Nome <input type=\"text\" name=\"nome\"></label>\n\
         <label>CPF <input type=\"text\" name=\"cpf\"></label>\n\
         <button type=\"submit\">Cadastrar</button>\n</form>\n\
         <table>\n<thead><tr><th>ID</th><th>Nome</th><th>CPF</th><th>Ações</th></tr></thead>\n<tbody>\n",
    );
    for p in people {
        let id = id_text(p.id);
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td>{name}</td><td>{cpf}</td><td>\
             <form method=\"POST\" action=\"/pessoas/excluir\">\
             <input type=\"hidden\" name=\"id\" value=\"{id}\">\
             <button type=\"submit\">Excluir</button></form></td></tr>",
            name = escape(&p.name),
            cpf = escape(&p.cpf.formatted()),
        );
    }
    body.push_str("</tbody>\n</table>\n");
    layout("Cadastro de Pessoas", &body)
}

/// Contacts table plus a create form whose person selector lists `people`.
pub fn contacts(contacts: &[(Contact, Person)], people: &[Person]) -> String {
    let mut body = String::from(
        "<form method=\"POST\" action=\"/contatos\">\n<label>Pessoa <select name=\"idPessoa\">\n",
    );
    for p in people {
        let _ = writeln!(
            body,
            "<option value=\"{}\">{}</option>",
            id_text(p.id),
            escape(&p.name),
        );
    }
    body.push_str(
        "</select></label>\n\
         <label>Tipo <select name=\"tipo\"><option value=\"1\">Email</option>\
         <option value=\"0\">Telefone</option></select></label>\n\
         <label>Descrição <input type=\"text\" name=\"descricao\"></label>\n\
         <button type=\"submit\">Cadastrar</button>\n</form>\n\
         <table>\n<thead><tr><th>ID</th><th>Tipo</th><th>Descrição</th><th>Pessoa</th><th>Ações</th></tr></thead>\n<tbody>\n",
    );
    for (c, p) in contacts {
        let id = id_text(c.id);
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td>{kind}</td><td>{description}</td><td>{person}</td><td>\
             <form method=\"POST\" action=\"/contatos/excluir\">\
             <input type=\"hidden\" name=\"id\" value=\"{id}\">\
             <button type=\"submit\">Excluir</button></form></td></tr>",
            kind = c.kind,
            description = escape(&c.description),
            person = escape(&p.name),
        );
    }
    body.push_str("</tbody>\n</table>\n");
    layout("Cadastro de Contatos", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpf::Cpf;
    use crate::model::ContactKind;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn people_page_lists_rows_escaped() {
        let mut p = Person::new("<b>Ana</b>", Cpf::parse("52998224725").unwrap());
        p.id = Some(4);
        let html = people(&[p]);
        assert!(html.contains("<td>4</td><td>&lt;b&gt;Ana&lt;/b&gt;</td><td>529.982.247-25</td>"));
        assert!(!html.contains("<b>Ana</b>"));
    }

    #[test]
    fn contacts_page_offers_people_in_selector() {
        let mut p = Person::new("Ana", Cpf::parse("52998224725").unwrap());
        p.id = Some(1);
        let mut c = Contact::new(ContactKind::Phone, "555-0100", 1);
        c.id = Some(9);
        let html = contacts(&[(c, p.clone())], &[p]);
        assert!(html.contains("<option value=\"1\">Ana</option>"));
        assert!(html.contains("<td>9</td><td>Telefone</td><td>555-0100</td><td>Ana</td>"));
    }
}
