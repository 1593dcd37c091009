mod workbook_reader;
