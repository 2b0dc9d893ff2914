use std::collections::HashMap;

use swc_ecma_ast::{Class, Decl, DefaultDecl, Function, ModuleDecl, ModuleItem, Stmt};

use crate::options::CompilerOptions;
use crate::parse::SourceFile;
use crate::program::{MemoryHost, Program};

pub(crate) fn parse_helper(contents: &str) -> SourceFile {
    SourceFile::parse("test.ts", contents.to_string()).expect("error parsing")
}

pub(crate) fn program_helper(files: &[(&str, &str)]) -> Program {
    let host = MemoryHost::new(
        files
            .iter()
            .map(|(name, contents)| (name.to_string(), contents.to_string()))
            .collect::<HashMap<_, _>>(),
    );
    let roots: Vec<String> = files.iter().map(|(name, _)| name.to_string()).collect();

    Program::new(&roots, &CompilerOptions::default(), &host).expect("error creating program")
}

fn top_level_decls(file: &SourceFile) -> impl Iterator<Item = &Decl> {
    file.module().body.iter().filter_map(|item| match item {
        ModuleItem::Stmt(Stmt::Decl(decl)) => Some(decl),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => Some(&export.decl),
        _ => None,
    })
}

pub(crate) fn first_class(file: &SourceFile) -> &Class {
    let declared = top_level_decls(file).find_map(|decl| match decl {
        Decl::Class(class) => Some(&*class.class),
        _ => None,
    });

    declared
        .or_else(|| {
            file.module().body.iter().find_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                    DefaultDecl::Class(class) => Some(&*class.class),
                    _ => None,
                },
                _ => None,
            })
        })
        .expect("no class in test source")
}

pub(crate) fn first_function(file: &SourceFile) -> &Function {
    top_level_decls(file)
        .find_map(|decl| match decl {
            Decl::Fn(function) => Some(&*function.function),
            _ => None,
        })
        .expect("no function in test source")
}
