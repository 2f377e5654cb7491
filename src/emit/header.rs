// File preamble and class doc tags shared by every generated PHP file.

use crate::config::HeaderConfig;

pub fn preamble(header: &HeaderConfig, namespace: &str) -> String {
    let mut out = String::new();
    out.push_str("<?php\n\n/**\n");
    out.push_str(" * This file was generated automatically. Do not edit!\n *\n");
    out.push_str(&format!(" * PHP version {}\n *\n", header.php_version));
    out.push_str(" * LICENSE:\n *\n");
    out.push_str(&format!(
        " * Copyright (c) {} {}\n *\n",
        header.copyright_year, header.copyright_holder
    ));
    for line in MIT_LICENSE.lines() {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(&format!(" * {line}\n"));
        }
    }
    out.push_str(" *\n");
    out.push_str(&class_tags(header, namespace));
    out.push_str(" */\n");
    out
}

pub fn class_tags(header: &HeaderConfig, namespace: &str) -> String {
    let copyright = format!("{} {}", header.copyright_year, header.copyright_holder);
    [
        ("category", header.category.as_str()),
        ("package", namespace),
        ("author", header.author.as_str()),
        ("copyright", copyright.as_str()),
        ("license", header.license.as_str()),
        ("link", header.link.as_str()),
    ]
    .iter()
    .map(|(tag, value)| format!(" * @{tag:<9} {value}\n"))
    .collect()
}

const MIT_LICENSE: &str = "\
Permission is hereby granted, free of charge, to any person obtaining
a copy of this software and associated documentation files (the
\"Software\"), to deal in the Software without restriction, including
without limitation the rights to use, copy, modify, merge, publish,
distribute, sublicense, and/or sell copies of the Software, and to
permit persons to whom the Software is furnished to do so, subject to
the following conditions:

The above copyright notice and this permission notice shall be
included in all copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND,
EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_are_column_aligned() {
        let tags = class_tags(&HeaderConfig::default(), "Jcupitt\\Vips");
        assert_eq!(
            tags,
            " * @category  Images\n \
             * @package   Jcupitt\\Vips\n \
             * @author    John Cupitt <jcupitt@gmail.com>\n \
             * @copyright 2016 John Cupitt\n \
             * @license   https://opensource.org/licenses/MIT MIT\n \
             * @link      https://github.com/jcupitt/php-vips\n"
        );
    }

    #[test]
    fn preamble_is_a_closed_doc_comment() {
        let text = preamble(&HeaderConfig::default(), "Jcupitt\\Vips");
        assert!(text.starts_with("<?php\n\n/**\n * This file was generated automatically. Do not edit!\n"));
        assert!(text.contains(" * Copyright (c) 2016 John Cupitt\n *\n * Permission is hereby granted"));
        assert!(text.contains("SOFTWARE.\n *\n * @category  Images\n"));
        assert!(text.ends_with(" * @link      https://github.com/jcupitt/php-vips\n */\n"));
    }
}
